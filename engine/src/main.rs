// LectureBot document engine
// Main entry point for the lecturebot binary

use clap::Parser;
use lecturebot_engine::cli::{Cli, Command};
use lecturebot_engine::config::Config;
use lecturebot_engine::handlers::{handle_list, handle_search, handle_start};
use lecturebot_engine::telemetry::{init_telemetry, init_telemetry_with_level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize basic telemetry first (before config is loaded)
    init_telemetry();

    tracing::info!("LectureBot v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // Re-initialize telemetry with config- or flag-driven log level
    // (only takes effect if RUST_LOG env var is not set)
    let level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(level);

    match cli.command {
        Command::Start => {
            tracing::info!("Starting bot...");
            handle_start(&config).await
        }

        Command::List { limit } => handle_list(limit, &config).await,

        Command::Search { query } => {
            tracing::info!("Searching for: {}", query);
            handle_search(&query, &config).await
        }
    }
}
