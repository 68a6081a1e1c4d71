use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lyricflow_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "lyricflow")]
#[command(author, version, about = "Karaoke lyrics synced to a playback clock")]
struct Cli {
    /// Use this config file instead of ~/.config/lyricflow/config.toml
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a lyrics file in the terminal
    Play {
        /// Lyrics file (.lrc or .json)
        file: PathBuf,
        /// Start position in milliseconds
        #[arg(long, default_value_t = 0)]
        start: i64,
        /// Playback rate
        #[arg(long, default_value_t = 1.0)]
        rate: f64,
    },
    /// Print corrected timings and pre-highlight parameters
    Inspect {
        file: PathBuf,
        /// Dump the corrected timeline as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tick the engine headlessly and print one JSON object per tick
    Simulate {
        file: PathBuf,
        /// First clock value in milliseconds
        #[arg(long, default_value_t = 0)]
        from: i64,
        /// Last clock value in milliseconds (inclusive)
        #[arg(long)]
        to: i64,
        /// Clock advance per tick in milliseconds
        #[arg(long, default_value_t = 100)]
        step: i64,
        /// Jump here after the last regular tick
        #[arg(long)]
        seek_to: Option<i64>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = Arc::new(
        AppConfig::load_from(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?,
    );

    // The TUI owns the terminal, so interactive sessions log to a file
    let log_file = match cli.command {
        Commands::Play { .. } => Some(config.log_path()),
        _ => None,
    };
    init_logging(&config, log_file)?;

    match cli.command {
        Commands::Play { file, start, rate } => {
            commands::play::run(config, &file, start, rate).await
        }
        Commands::Inspect { file, json } => commands::inspect::run(&config, &file, json).await,
        Commands::Simulate {
            file,
            from,
            to,
            step,
            seek_to,
        } => {
            let plan = commands::simulate::Plan {
                from,
                to,
                step,
                seek_to,
            };
            commands::simulate::run(&config, &file, plan).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path(&config_path),
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => commands::config::init(&config_path, force),
        },
    }
}

fn init_logging(config: &AppConfig, log_file: Option<PathBuf>) -> Result<()> {
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
    Ok(())
}
