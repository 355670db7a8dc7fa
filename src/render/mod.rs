//! Terminal rendering of the game

pub mod renderer;

pub use renderer::{CellShape, Renderer};
