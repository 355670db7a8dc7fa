//! Smooth Snake - a terminal Snake game on a wrap-around grid
//!
//! This library provides:
//! - Core game logic: movement, collision, growth, scoring (game module)
//! - Per-frame smoothing of segment positions for drawing (game::motion)
//! - High score persistence behind a small store trait (persistence module)
//! - TUI rendering, keyboard input and the interactive mode (render, input, modes)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod persistence;
pub mod render;
