/// DisplaySurface: the mounted game view.
///
/// Owns one `div.game` container appended to a caller-supplied parent.
/// The static grid is drawn into it once at creation; the actor layer is
/// thrown away and rebuilt on every `update`.
///
/// ## Scrolling
///
/// Only the container's horizontal scroll moves. The viewport is
/// `VIEWPORT_WIDTH` px wide with a `VIEWPORT_WIDTH / 2` margin, so the
/// player's visual centre is pulled back to the viewport centre whenever it
/// leaves it:
///
///   - `center.x < left + margin`  → scroll to `center.x - margin`
///   - `center.x > right - margin` → scroll to `center.x + margin - width`
///   - otherwise unchanged
///
/// ## Lifecycle
///
/// `Fresh` → `Live` (after the first update) → `TornDown` (terminal).
/// Once torn down, `update` and `scroll_player_into_view` return
/// `DisplayError::TornDown`; repeated `teardown` calls are no-ops.

use log::{debug, info};
use thiserror::Error;

use crate::display::actors::ActorDrawer;
use crate::display::grid::draw_grid;
use crate::dom::{Document, DomError, NodeId, Style};
use crate::domain::level::Level;
use crate::domain::state::GameState;
use crate::domain::vec::Vec2;
use crate::ui::input::KeyState;

/// Visible width of the scrolling window, in pixels.
pub const VIEWPORT_WIDTH: f64 = 600.0;
/// Distance from either viewport edge the player's centre must keep.
pub const SCROLL_MARGIN: f64 = VIEWPORT_WIDTH / 2.0;
/// Horizontal extent used to find the player's visual centre, in level
/// units. Kept separate from `player.size.x`.
pub const PLAYER_WIDTH: f64 = 12.8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisplayError {
    #[error("display surface used after teardown")]
    TornDown,
    #[error(transparent)]
    Dom(#[from] DomError),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SurfacePhase {
    /// Created, never updated.
    Fresh,
    /// Updated at least once.
    Live,
    /// Detached from its parent. Terminal.
    TornDown,
}

/// New scroll offset for a player centred at `center_x`, or `None` if the
/// player is already inside the central band of the viewport at `left`.
pub fn scroll_target(left: f64, center_x: f64) -> Option<f64> {
    let right = left + VIEWPORT_WIDTH;
    if center_x < left + SCROLL_MARGIN {
        Some(center_x - SCROLL_MARGIN)
    } else if center_x > right - SCROLL_MARGIN {
        Some(center_x + SCROLL_MARGIN - VIEWPORT_WIDTH)
    } else {
        None
    }
}

pub struct DisplaySurface<D: ActorDrawer> {
    parent: NodeId,
    dom: NodeId,
    actor_layer: Option<NodeId>,
    drawer: D,
    scale: f64,
    phase: SurfacePhase,
    ticks: u64,
}

impl<D: ActorDrawer> DisplaySurface<D> {
    /// Draw `level` into a new container and mount it under `parent`.
    pub fn create(
        doc: &mut Document,
        parent: NodeId,
        level: &Level,
        drawer: D,
        scale: f64,
    ) -> Result<Self, DisplayError> {
        // Check the mount point before building anything into the arena.
        doc.element(parent)?;
        let grid = draw_grid(doc, level)?;
        let dom = doc.elt("div", "game", Style::default(), [grid])?;
        doc.append_child(parent, dom)?;
        info!(
            "display mounted: {} rows, widest {} tiles, scale {}",
            level.height(),
            level.width(),
            scale
        );
        Ok(DisplaySurface {
            parent,
            dom,
            actor_layer: None,
            drawer,
            scale,
            phase: SurfacePhase::Fresh,
            ticks: 0,
        })
    }

    /// Redraw actors for `state`, restyle by status and follow the player.
    pub fn update(
        &mut self,
        doc: &mut Document,
        state: &GameState,
        keys: &KeyState,
    ) -> Result<(), DisplayError> {
        self.ensure_mounted()?;

        if let Some(old) = self.actor_layer.take() {
            doc.remove(old)?;
        }
        let layer = self.drawer.draw_actors(doc, state, keys)?;
        doc.append_child(self.dom, layer)?;
        self.actor_layer = Some(layer);

        doc.set_class(self.dom, &format!("game {}", state.status))?;
        self.scroll_player_into_view(doc, state)?;

        self.phase = SurfacePhase::Live;
        self.ticks += 1;
        debug!("display tick {}: status {}", self.ticks, state.status);
        Ok(())
    }

    /// Adjust the container's horizontal scroll so the player stays
    /// within the central band of the viewport.
    pub fn scroll_player_into_view(
        &mut self,
        doc: &mut Document,
        state: &GameState,
    ) -> Result<(), DisplayError> {
        self.ensure_mounted()?;

        let player = &state.player;
        let center = player
            .pos
            .plus(Vec2::new(PLAYER_WIDTH / 2.0, player.size.y / 2.0))
            .times(self.scale);
        let left = doc.scroll_left(self.dom)?;

        if let Some(target) = scroll_target(left, center.x) {
            debug!("scroll {left} -> {target} (player centre x {})", center.x);
            doc.set_scroll_left(self.dom, target)?;
        }
        Ok(())
    }

    /// Detach the container from its parent and free it.
    pub fn teardown(&mut self, doc: &mut Document) -> Result<(), DisplayError> {
        if self.phase == SurfacePhase::TornDown {
            return Ok(());
        }
        self.actor_layer = None;
        doc.remove(self.dom)?;
        self.phase = SurfacePhase::TornDown;
        info!("display torn down after {} ticks", self.ticks);
        Ok(())
    }

    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    /// Number of successful updates.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn container(&self) -> NodeId {
        self.dom
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn actor_layer(&self) -> Option<NodeId> {
        self.actor_layer
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn ensure_mounted(&self) -> Result<(), DisplayError> {
        match self.phase {
            SurfacePhase::TornDown => Err(DisplayError::TornDown),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::actors::DomActorDrawer;
    use crate::domain::state::{Actor, Status};

    const SCALE: f64 = 16.0;

    fn level() -> Level {
        vec![
            vec!["empty", "empty", "empty", "empty"],
            vec!["wall", "wall", "lava", "wall"],
        ]
        .into_iter()
        .collect()
    }

    /// State whose player visual centre lands at `center_x` pixels.
    fn state_centered_at(center_x: f64) -> GameState {
        let x = center_x / SCALE - PLAYER_WIDTH / 2.0;
        GameState::new(Actor::player(Vec2::new(x, 0.0)), vec![])
    }

    fn mounted() -> (Document, DisplaySurface<DomActorDrawer>) {
        let mut doc = Document::new();
        let parent = doc.root();
        let surface =
            DisplaySurface::create(&mut doc, parent, &level(), DomActorDrawer::new(SCALE), SCALE)
                .unwrap();
        (doc, surface)
    }

    fn actor_layers(doc: &Document, surface: &DisplaySurface<DomActorDrawer>) -> usize {
        doc.children(surface.container())
            .unwrap()
            .iter()
            .filter(|&&c| doc.element(c).unwrap().class_name() == "actors")
            .count()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    // ── create ──

    #[test]
    fn create_mounts_grid_in_container() {
        let (doc, surface) = mounted();
        let container = doc.element(surface.container()).unwrap();
        assert_eq!(container.tag(), "div");
        assert_eq!(container.class_name(), "game");
        assert_eq!(container.parent(), Some(doc.root()));
        assert_eq!(container.children().len(), 1);

        let table = doc.element(container.children()[0]).unwrap();
        assert_eq!(table.class_name(), "background");
        assert_eq!(table.children().len(), 2);
        assert_eq!(surface.actor_layer(), None);
        assert_eq!(surface.phase(), SurfacePhase::Fresh);
    }

    #[test]
    fn create_rejects_unknown_parent() {
        let mut doc = Document::new();
        let gone = doc.create_element("div", "", Style::default());
        doc.remove(gone).unwrap();
        let before = doc.live_count();
        let res = DisplaySurface::create(&mut doc, gone, &level(), DomActorDrawer::new(SCALE), SCALE);
        assert!(matches!(res, Err(DisplayError::Dom(DomError::UnknownNode(_)))));
        assert_eq!(doc.live_count(), before);
    }

    // ── update ──

    #[test]
    fn repeated_updates_keep_single_actor_layer() {
        let (mut doc, mut surface) = mounted();
        let keys = KeyState::new();
        let state = state_centered_at(320.0);

        surface.update(&mut doc, &state, &keys).unwrap();
        let after_first = doc.live_count();
        for _ in 0..5 {
            surface.update(&mut doc, &state, &keys).unwrap();
            assert_eq!(actor_layers(&doc, &surface), 1);
        }
        // Old layers are freed, not just detached.
        assert_eq!(doc.live_count(), after_first);
        assert_eq!(surface.ticks(), 6);
        assert_eq!(surface.phase(), SurfacePhase::Live);

        let children = doc.children(surface.container()).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(Some(children[1]), surface.actor_layer());
    }

    #[test]
    fn arena_stays_bounded_across_many_updates() {
        let (mut doc, mut surface) = mounted();
        let keys = KeyState::new();
        let coins: Vec<Actor> = (0..10)
            .map(|i| Actor::new("coin", Vec2::new(i as f64, 1.0), Vec2::new(0.6, 0.6)))
            .collect();
        let mut state = state_centered_at(320.0);
        state.actors = coins;

        surface.update(&mut doc, &state, &keys).unwrap();
        let slots = doc.slot_count();
        let live = doc.live_count();
        for _ in 0..10_000 {
            surface.update(&mut doc, &state, &keys).unwrap();
        }
        assert_eq!(doc.live_count(), live);
        assert_eq!(doc.slot_count(), slots);
    }

    #[test]
    fn status_drives_container_class() {
        let (mut doc, mut surface) = mounted();
        let keys = KeyState::new();
        let mut state = state_centered_at(320.0);

        surface.update(&mut doc, &state, &keys).unwrap();
        assert_eq!(doc.element(surface.container()).unwrap().class_name(), "game playing");

        state.status = Status::Won;
        surface.update(&mut doc, &state, &keys).unwrap();
        assert_eq!(doc.element(surface.container()).unwrap().class_name(), "game won");

        state.status = Status::Lost;
        surface.update(&mut doc, &state, &keys).unwrap();
        assert_eq!(doc.element(surface.container()).unwrap().class_name(), "game lost");
    }

    // ── scrolling ──

    #[test]
    fn scroll_target_policy() {
        assert_eq!(scroll_target(0.0, 300.0), None);
        assert_eq!(scroll_target(0.0, 250.0), Some(-50.0));
        assert_eq!(scroll_target(0.0, 500.0), Some(200.0));
        assert_eq!(scroll_target(1000.0, 1300.0), None);
        assert_eq!(scroll_target(1000.0, 1290.0), Some(990.0));
        assert_eq!(scroll_target(1000.0, 1310.0), Some(1010.0));
    }

    #[test]
    fn player_left_of_band_scrolls_left() {
        let (mut doc, mut surface) = mounted();
        surface.scroll_player_into_view(&mut doc, &state_centered_at(250.0)).unwrap();
        assert!(close(doc.scroll_left(surface.container()).unwrap(), -50.0));
    }

    #[test]
    fn player_right_of_band_scrolls_right() {
        let (mut doc, mut surface) = mounted();
        surface.scroll_player_into_view(&mut doc, &state_centered_at(500.0)).unwrap();
        assert!(close(doc.scroll_left(surface.container()).unwrap(), 200.0));
    }

    #[test]
    fn scroll_is_idempotent_inside_band() {
        let (mut doc, mut surface) = mounted();
        let state = state_centered_at(900.0);
        surface.scroll_player_into_view(&mut doc, &state).unwrap();
        let first = doc.scroll_left(surface.container()).unwrap();
        assert!(close(first, 600.0));

        for _ in 0..3 {
            surface.scroll_player_into_view(&mut doc, &state).unwrap();
            assert!(close(doc.scroll_left(surface.container()).unwrap(), first));
        }
    }

    #[test]
    fn centre_ignores_player_size_x() {
        let (mut doc, mut surface) = mounted();
        // pos.x = 0 → centre.x = (0 + 6.4) * 16 = 102.4 → scroll 102.4 - 300.
        let mut state = GameState::new(Actor::player(Vec2::new(0.0, 0.0)), vec![]);
        state.player.size = Vec2::new(40.0, 2.0);
        surface.scroll_player_into_view(&mut doc, &state).unwrap();
        assert!(close(doc.scroll_left(surface.container()).unwrap(), 102.4 - 300.0));
    }

    #[test]
    fn update_scrolls() {
        let (mut doc, mut surface) = mounted();
        surface.update(&mut doc, &state_centered_at(500.0), &KeyState::new()).unwrap();
        assert!(close(doc.scroll_left(surface.container()).unwrap(), 200.0));
    }

    // ── teardown ──

    #[test]
    fn teardown_detaches_container() {
        let (mut doc, mut surface) = mounted();
        surface.update(&mut doc, &state_centered_at(320.0), &KeyState::new()).unwrap();
        let container = surface.container();
        let parent = surface.parent();

        surface.teardown(&mut doc).unwrap();
        assert!(!doc.is_descendant(container, parent));
        assert!(doc.children(parent).unwrap().is_empty());
        assert_eq!(doc.live_count(), 1);
        assert_eq!(surface.phase(), SurfacePhase::TornDown);
    }

    #[test]
    fn use_after_teardown_is_an_error() {
        let (mut doc, mut surface) = mounted();
        surface.teardown(&mut doc).unwrap();
        let state = state_centered_at(320.0);
        assert_eq!(
            surface.update(&mut doc, &state, &KeyState::new()),
            Err(DisplayError::TornDown)
        );
        assert_eq!(
            surface.scroll_player_into_view(&mut doc, &state),
            Err(DisplayError::TornDown)
        );
        // Second teardown is a no-op.
        assert_eq!(surface.teardown(&mut doc), Ok(()));
        assert_eq!(surface.ticks(), 0);
    }
}
