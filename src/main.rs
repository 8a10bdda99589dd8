use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use snake_bite::audio::Audio;
use snake_bite::game::{GameConfig, GameEngine};
use snake_bite::modes::{HumanMode, banner};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "snake_bite")]
#[command(version, about = "Snake game for the terminal")]
struct Cli {
    /// JSON file with a game configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<usize>,

    /// Simulation ticks per second
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Directory holding eat.wav and game_over.wav
    #[arg(long, default_value = ".")]
    sound_dir: PathBuf,

    /// Disable sound entirely
    #[arg(long)]
    mute: bool,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
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
        if let Some(tick_rate) = self.tick_rate {
            config.ticks_per_second = tick_rate;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

/// The terminal belongs to the game, so logs only ever go to a file
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {path:?}"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("Failed to install log subscriber")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = cli.game_config()?;

    println!("{}", banner(&config));

    let engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, seed)?,
        None => GameEngine::new(config)?,
    };
    let audio = if cli.mute {
        Audio::muted()
    } else {
        Audio::open(&cli.sound_dir)
    };

    let mut human_mode = HumanMode::new(engine, audio);
    human_mode.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["snake_bite"]).unwrap();
        let config = cli.game_config().unwrap();

        assert_eq!(config, GameConfig::default());
        assert_eq!(cli.sound_dir, PathBuf::from("."));
        assert!(!cli.mute);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"grid_width": 20, "grid_height": 20, "food_reward": 5}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["snake_bite", "--config", &path, "--width", "25"]).unwrap();
        let config = cli.game_config().unwrap();

        assert_eq!(config.grid_width, 25);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.food_reward, 5);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let cli = Cli::try_parse_from(["snake_bite", "--tick-rate", "0"]).unwrap();
        assert!(cli.game_config().is_err());

        let cli = Cli::try_parse_from(["snake_bite", "--width", "1"]).unwrap();
        assert!(cli.game_config().is_err());
    }
}
