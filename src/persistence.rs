//! High score persistence
//!
//! The high score is a single whole number. The file-backed store keeps it as
//! decimal text; reading never fails, a missing or unreadable file simply
//! means no high score yet.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Somewhere a high score can be loaded from and saved to
pub trait HighScoreStore {
    /// Current persisted high score, or 0 when there is none
    fn load(&mut self) -> u32;

    /// Replace the persisted high score
    fn save(&mut self, high_score: u32) -> Result<()>;
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for Box<S> {
    fn load(&mut self) -> u32 {
        (**self).load()
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        (**self).save(high_score)
    }
}

/// Stores the high score as decimal text in a file
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&mut self) -> u32 {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) => {
                debug!(path = ?self.path, %err, "no high score file, starting from 0");
                return 0;
            }
        };

        match text.trim().parse::<u32>() {
            Ok(score) => score,
            Err(err) => {
                warn!(path = ?self.path, %err, "ignoring malformed high score file");
                0
            }
        }
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        std::fs::write(&self.path, high_score.to_string())
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;
        debug!(path = ?self.path, high_score, "high score saved");
        Ok(())
    }
}

/// Keeps the high score in memory for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    high_score: u32,
    saves: usize,
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(high_score: u32) -> Self {
        Self { high_score, saves: 0 }
    }

    /// How many times `save` has been called
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&mut self) -> u32 {
        self.high_score
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        self.high_score = high_score;
        self.saves += 1;
        Ok(())
    }
}
