pub mod grid_world;

pub use grid_world::{Cell, GridAction, GridError, GridState, GridWorld, Pos};
