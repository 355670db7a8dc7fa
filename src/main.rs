use anyhow::{anyhow, Context, Result};
use clap::Parser;
use smooth_snake::game::GameConfig;
use smooth_snake::modes::HumanMode;
use smooth_snake::persistence::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "smooth-snake")]
#[command(version, about = "Snake on a wrap-around grid with smooth motion")]
struct Cli {
    /// JSON file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<usize>,

    /// Rendered frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Snake moves per second
    #[arg(long)]
    speed: Option<u32>,

    /// Fraction of the remaining distance each segment is drawn closer per frame
    #[arg(long)]
    smoothing: Option<f32>,

    /// File holding the high score
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    /// Keep the high score in memory only
    #[arg(long)]
    no_persist: bool,

    /// Write logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Resolve the game configuration: defaults, then the config file, then flags
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(speed) = self.speed {
            config.snake_speed = speed;
        }
        if let Some(smoothing) = self.smoothing {
            config.smoothing = smoothing;
        }
        if let Some(path) = &self.high_score_file {
            config.high_score_path = path.clone();
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }

    fn high_score_store(&self, config: &GameConfig) -> Box<dyn HighScoreStore> {
        if self.no_persist {
            Box::new(MemoryHighScoreStore::new())
        } else {
            Box::new(FileHighScoreStore::new(&config.high_score_path))
        }
    }
}

/// Send tracing output to a file; the terminal belongs to the game
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("Failed to set tracing subscriber")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;
    info!(
        width = config.grid_width,
        height = config.grid_height,
        fps = config.fps,
        speed = config.snake_speed,
        "starting smooth-snake v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = cli.high_score_store(&config);
    let mut human_mode = HumanMode::new(config, store);
    human_mode.run().await?;

    Ok(())
}
