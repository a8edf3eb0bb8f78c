pub mod actors;
pub mod grid;
pub mod surface;

pub use actors::{ActorDrawer, DomActorDrawer};
pub use grid::draw_grid;
pub use surface::{DisplayError, DisplaySurface, SurfacePhase};
