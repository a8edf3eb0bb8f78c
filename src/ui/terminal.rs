/// Terminal presenter: paints a display surface's element tree with crossterm.
///
/// How it works:
///   1. Compose the visible window of the surface into `front` (array of Cell)
///   2. Compare each cell with `back` (previous frame)
///   3. Only emit terminal commands for cells that changed, batched with `queue!`
///   4. Swap front/back
///
/// Each level unit is `CELL_W` terminal columns wide and one row high. The
/// window starts at the container's `scroll_left / scale` and spans
/// `VIEWPORT_WIDTH / scale` units, so the terminal follows the same scroll
/// the surface computes.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::display::actors::ActorDrawer;
use crate::display::surface::{DisplaySurface, VIEWPORT_WIDTH};
use crate::dom::{Document, Element, NodeId};
use crate::domain::tile::Tile;

/// Terminal columns per level unit.
const CELL_W: usize = 2;
/// Banner row; the map starts below it.
const BANNER_ROW: usize = 0;
const MAP_ROW: usize = 2;

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

// ── Cell / FrameBuffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Differs from every real cell, forcing a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

pub struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg: BASE_BG });
        }
    }

    /// Row `y` as text, for inspection.
    pub fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Composition ──

fn tile_cell(class: &str) -> Cell {
    match Tile::from_label(class) {
        Some(Tile::Empty) => Cell::BLANK,
        Some(Tile::Wall) => Cell { ch: '█', fg: Color::Grey, bg: BASE_BG },
        Some(Tile::Lava) => Cell { ch: '≈', fg: Color::Red, bg: BASE_BG },
        None => Cell { ch: '?', fg: Color::DarkGrey, bg: BASE_BG },
    }
}

fn actor_cell(el: &Element) -> Cell {
    let (ch, fg) = if el.has_class("player") {
        (if el.has_class("left") { '<' } else if el.has_class("right") { '>' } else { '@' }, Color::Yellow)
    } else if el.has_class("coin") {
        ('$', Color::Rgb { r: 241, g: 229, b: 89 })
    } else if el.has_class("lava") {
        ('~', Color::Red)
    } else {
        ('*', Color::Cyan)
    };
    Cell { ch, fg, bg: BASE_BG }
}

/// Paint the visible window of the `container` subtree into `fb`.
pub fn compose(fb: &mut FrameBuffer, doc: &Document, container: NodeId, scale: f64) {
    fb.clear();
    let Some(root) = doc.get(container) else { return };

    let origin = (root.scroll_left() / scale).floor() as i64;
    let view_units = ((VIEWPORT_WIDTH / scale).ceil() as usize).min(fb.width / CELL_W);

    // Level unit (ux, uy) → terminal (x, y), if visible.
    let place = |ux: i64, uy: i64| -> Option<(usize, usize)> {
        let vx = ux - origin;
        if vx < 0 || vx >= view_units as i64 || uy < 0 {
            return None;
        }
        Some((vx as usize * CELL_W, uy as usize + MAP_ROW))
    };

    for &child in root.children() {
        let Some(el) = doc.get(child) else { continue };
        if el.tag() == "table" {
            for (uy, &tr) in el.children().iter().enumerate() {
                let Ok(tds) = doc.children(tr) else { continue };
                for (ux, &td) in tds.iter().enumerate() {
                    let Some(td_el) = doc.get(td) else { continue };
                    if let Some((x, y)) = place(ux as i64, uy as i64) {
                        let cell = tile_cell(td_el.class_name());
                        for dx in 0..CELL_W {
                            fb.set(x + dx, y, cell);
                        }
                    }
                }
            }
        } else if el.has_class("actors") {
            for &actor in el.children() {
                let Some(a) = doc.get(actor) else { continue };
                let s = a.style();
                let (left, top) = (s.left.unwrap_or(0.0) / scale, s.top.unwrap_or(0.0) / scale);
                let w = (s.width.unwrap_or(scale) / scale).ceil().max(1.0) as i64;
                let h = (s.height.unwrap_or(scale) / scale).ceil().max(1.0) as i64;
                let cell = actor_cell(a);
                for uy in 0..h {
                    for ux in 0..w {
                        if let Some((x, y)) = place(left.floor() as i64 + ux, top.floor() as i64 + uy) {
                            for dx in 0..CELL_W {
                                fb.set(x + dx, y, cell);
                            }
                        }
                    }
                }
            }
        }
    }

    if root.has_class("won") {
        fb.put_str(0, BANNER_ROW, "LEVEL CLEARED", Color::Green);
    } else if root.has_class("lost") {
        fb.put_str(0, BANNER_ROW, "YOU DIED", Color::Red);
    }
}

// ── Presenter ──

pub struct TerminalPresenter {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Terminal accepted the keyboard enhancement flags and reports
    /// key Release events.
    release_events: bool,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        TerminalPresenter {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            release_events: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.release_events = true;
        }
        self.resize_to_terminal();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.release_events {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.release_events = false;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Whether key Release events can be trusted; feed into
    /// `KeyState::honor_release`.
    pub fn reports_key_release(&self) -> bool {
        self.release_events
    }

    pub fn present<D: ActorDrawer>(
        &mut self,
        doc: &Document,
        surface: &DisplaySurface<D>,
    ) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize_to_terminal();
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        compose(&mut self.front, doc, surface.container(), surface.scale());
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn resize_to_terminal(&mut self) {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        TerminalPresenter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::actors::DomActorDrawer;
    use crate::domain::level::Level;
    use crate::domain::state::{Actor, GameState, Status};
    use crate::domain::vec::Vec2;
    use crate::ui::input::KeyState;

    const SCALE: f64 = 16.0;

    fn corridor(len: usize) -> Level {
        let mut floor = vec!["wall"; len];
        floor[3] = "lava";
        vec![vec!["empty"; len], floor].into_iter().collect()
    }

    fn surface_with(level: &Level) -> (Document, DisplaySurface<DomActorDrawer>) {
        let mut doc = Document::new();
        let root = doc.root();
        let s = DisplaySurface::create(&mut doc, root, level, DomActorDrawer::new(SCALE), SCALE).unwrap();
        (doc, s)
    }

    #[test]
    fn grid_and_player_painted_at_unit_columns() {
        let level = corridor(10);
        let (mut doc, mut surface) = surface_with(&level);
        let state = GameState::new(Actor::player(Vec2::new(2.0, 0.0)), vec![]);
        surface.update(&mut doc, &state, &KeyState::new()).unwrap();
        // Player near the left edge pulls scroll negative; move it back for a clean origin.
        doc.set_scroll_left(surface.container(), 0.0).unwrap();

        let mut fb = FrameBuffer::new(80, 10);
        compose(&mut fb, &doc, surface.container(), SCALE);

        assert_eq!(fb.get(4, MAP_ROW).ch, '@');
        assert_eq!(fb.get(5, MAP_ROW).ch, '@');
        assert_eq!(fb.get(0, MAP_ROW + 1).ch, '█');
        assert_eq!(fb.get(6, MAP_ROW + 1).ch, '≈');
        assert_eq!(fb.get(6, MAP_ROW + 1).fg, Color::Red);
    }

    #[test]
    fn window_follows_scroll_offset() {
        let level = corridor(100);
        let (mut doc, surface) = surface_with(&level);
        // Scroll by five units: the lava at unit 3 leaves the window.
        doc.set_scroll_left(surface.container(), 5.0 * SCALE).unwrap();

        let mut fb = FrameBuffer::new(200, 10);
        compose(&mut fb, &doc, surface.container(), SCALE);
        assert!(!fb.row_text(MAP_ROW + 1).contains('≈'));

        // Viewport is 600px / 16 = 37.5 → 38 units → 76 columns.
        assert_eq!(fb.get(75, MAP_ROW + 1).ch, '█');
        assert_eq!(fb.get(76, MAP_ROW + 1).ch, ' ');
    }

    #[test]
    fn status_banner() {
        let level = corridor(10);
        let (mut doc, mut surface) = surface_with(&level);
        let mut state = GameState::new(Actor::player(Vec2::new(1.0, 0.0)), vec![]);
        state.status = Status::Lost;
        surface.update(&mut doc, &state, &KeyState::new()).unwrap();

        let mut fb = FrameBuffer::new(80, 10);
        compose(&mut fb, &doc, surface.container(), SCALE);
        assert!(fb.row_text(BANNER_ROW).starts_with("YOU DIED"));
    }

    #[test]
    fn torn_down_surface_paints_nothing() {
        let level = corridor(10);
        let (mut doc, mut surface) = surface_with(&level);
        surface.teardown(&mut doc).unwrap();

        let mut fb = FrameBuffer::new(40, 6);
        compose(&mut fb, &doc, surface.container(), SCALE);
        for y in 0..6 {
            assert_eq!(fb.row_text(y).trim(), "");
        }
    }
}
