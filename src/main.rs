/// Demo host: mounts a built-in level and walks the player across it.
///
/// Stands in for the external game engine: each tick it advances a scripted
/// player, hands the snapshot to the display surface and paints the result
/// to the terminal. `q`, `Esc` or Ctrl+C quits.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{error, info};

use tilescroll::config::DisplayConfig;
use tilescroll::display::{DisplaySurface, DomActorDrawer};
use tilescroll::dom::Document;
use tilescroll::domain::level::Level;
use tilescroll::domain::state::{Actor, GameState, Status};
use tilescroll::domain::tile::Tile;
use tilescroll::domain::vec::Vec2;
use tilescroll::ui::input::KeyState;
use tilescroll::ui::terminal::TerminalPresenter;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
/// Logs go here, not stderr: the presenter owns the terminal in raw mode
/// and never repaints cells a stray log line lands on.
const LOG_FILE: &str = "tilescroll.log";
const LEVEL_WIDTH: usize = 200;
const LEVEL_HEIGHT: usize = 12;
const FLOOR_Y: usize = LEVEL_HEIGHT - 2;

fn main() {
    init_logging(Path::new(LOG_FILE));

    let config = DisplayConfig::load();
    let mut presenter = TerminalPresenter::new();

    if let Err(e) = presenter.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = run(&mut presenter, &config);

    if let Err(e) = presenter.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        error!("demo aborted: {e}");
        eprintln!("Display error: {e}");
    }
}

fn run(presenter: &mut TerminalPresenter, config: &DisplayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let level = demo_level();
    let mut doc = Document::new();
    let parent = doc.root();
    let mut surface = DisplaySurface::create(
        &mut doc,
        parent,
        &level,
        DomActorDrawer::new(config.scale),
        config.scale,
    )?;

    let mut keys = KeyState::with_release_events(presenter.reports_key_release());
    let mut walk = Patrol::new(1.0, (LEVEL_WIDTH - 2) as f64, config.speed.walk_speed);
    let mut state = GameState::new(
        Actor::player(Vec2::new(walk.x, FLOOR_Y as f64 - 1.5)),
        coins(),
    );
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        keys.drain_events();
        if keys.quit_requested() {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            walk.step();
            state.player.pos.x = walk.x;
            state.status = walk.status();
            surface.update(&mut doc, &state, &keys)?;
            last_tick = Instant::now();
        }

        presenter.present(&doc, &surface)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    surface.teardown(&mut doc)?;
    info!("demo finished after {} ticks", surface.ticks());
    Ok(())
}

fn init_logging(path: &Path) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match open_log_file(path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => {
            eprintln!("Logging disabled: could not open {}: {e}", path.display());
            builder.target(env_logger::Target::Pipe(Box::new(io::sink())));
        }
    }
    builder.init();
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Scripted back-and-forth walk. Reaching the far end counts as a win
/// until the walk returns to the start.
struct Patrol {
    x: f64,
    min: f64,
    max: f64,
    speed: f64,
    reached_end: bool,
}

impl Patrol {
    fn new(min: f64, max: f64, speed: f64) -> Self {
        Patrol { x: min, min, max, speed, reached_end: false }
    }

    fn step(&mut self) {
        let dir = if self.reached_end { -1.0 } else { 1.0 };
        self.x = (self.x + dir * self.speed).clamp(self.min, self.max);
        if self.x >= self.max {
            self.reached_end = true;
        } else if self.x <= self.min {
            self.reached_end = false;
        }
    }

    fn status(&self) -> Status {
        if self.reached_end { Status::Won } else { Status::Playing }
    }
}

/// Open corridor with a floor, a ceiling and a lava pit every 23 columns.
fn demo_level() -> Level {
    (0..LEVEL_HEIGHT)
        .map(|y| {
            (0..LEVEL_WIDTH)
                .map(|x| {
                    let tile = if y == 0 || y >= FLOOR_Y || x == 0 || x == LEVEL_WIDTH - 1 {
                        if y == FLOOR_Y && x % 23 == 11 { Tile::Lava } else { Tile::Wall }
                    } else {
                        Tile::Empty
                    };
                    tile.label()
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn coins() -> Vec<Actor> {
    (1..LEVEL_WIDTH / 17)
        .map(|i| Actor::new("coin", Vec2::new((i * 17) as f64, 4.0), Vec2::new(0.6, 0.6)))
        .collect()
}
