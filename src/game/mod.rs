//! Core game logic module for Snake
//!
//! This module contains all the game logic without any terminal or rendering
//! dependencies, so it can be driven directly from tests.

pub mod action;
pub mod config;
pub mod motion;
pub mod round;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::{ConfigError, GameConfig};
pub use motion::MotionInterpolator;
pub use round::{Control, FrameOutcome, RoundController, RoundPhase};
pub use state::{Grid, MoveResult, Position, Segment, SmoothPoint, Snake};
