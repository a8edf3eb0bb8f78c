pub mod level;
pub mod state;
pub mod tile;
pub mod vec;
