use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest accepted grid width or height, in cells
pub const MAX_GRID_DIMENSION: usize = 1024;

/// Reasons a configuration cannot drive a game
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must be at least 1x1 (got {width}x{height})")]
    EmptyGrid { width: usize, height: usize },

    #[error("grid cannot exceed {max}x{max} (got {width}x{height})")]
    GridTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("fps must be greater than zero")]
    ZeroFps,

    #[error("snake speed must be greater than zero")]
    ZeroSpeed,

    #[error("snake speed ({speed}) cannot exceed fps ({fps})")]
    SpeedAboveFps { speed: u32, fps: u32 },

    #[error("smoothing factor must lie strictly between 0 and 1 (got {0})")]
    SmoothingOutOfRange(f32),

    #[error("cell size must be a positive finite number (got {0})")]
    InvalidCellSize(f32),
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Size of one cell in continuous (drawing) units
    pub cell_size: f32,
    /// Rendered frames per second
    pub fps: u32,
    /// Discrete moves per second
    pub snake_speed: u32,
    /// Fraction of the remaining distance covered by each smoothing step
    pub smoothing: f32,
    /// Points awarded per food eaten
    pub food_reward: u32,
    /// Where the high score is persisted
    pub high_score_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 40,
            grid_height: 30,
            cell_size: 20.0,
            fps: 60,
            snake_speed: 10,
            smoothing: 0.1,
            food_reward: 10,
            high_score_path: PathBuf::from("high_score.txt"),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file; missing keys take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Number of rendered frames between two discrete moves
    pub fn ticks_per_move(&self) -> u64 {
        u64::from(self.fps / self.snake_speed.max(1)).max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.grid_width > MAX_GRID_DIMENSION || self.grid_height > MAX_GRID_DIMENSION {
            return Err(ConfigError::GridTooLarge {
                width: self.grid_width,
                height: self.grid_height,
                max: MAX_GRID_DIMENSION,
            });
        }
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        if self.snake_speed == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if self.snake_speed > self.fps {
            return Err(ConfigError::SpeedAboveFps {
                speed: self.snake_speed,
                fps: self.fps,
            });
        }
        if !(self.smoothing > 0.0 && self.smoothing < 1.0) {
            return Err(ConfigError::SmoothingOutOfRange(self.smoothing));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }
}
