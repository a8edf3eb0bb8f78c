/// Tile-level display surface.
///
/// A level is drawn once into a retained element tree (`dom`), actors are
/// redrawn every tick on a replaceable layer, and the container's horizontal
/// scroll follows the player.

pub mod config;
pub mod display;
pub mod dom;
pub mod domain;
pub mod ui;
