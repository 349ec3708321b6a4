//! Seat Tracker CLI
//!
//! Command-line interface for the seat occupancy and sitting-time service.

use std::path::PathBuf;

use clap::Parser;
use seat_tracker::config::StorageConfig;
use seat_tracker::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "seat-tracker")]
#[command(about = "Seat occupancy and sitting-time service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port (overrides config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Storage connection string, e.g. sqlite:///var/lib/seat-tracker/readings.db or memory://
    #[arg(long, env = "DATABASE_URI")]
    database_uri: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, port={:?}, database_uri={:?}, log_level={:?}",
        args.config,
        args.port,
        args.database_uri,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }

    if let Some(uri) = &args.database_uri {
        config.storage = StorageConfig::from_uri(uri)?;
    }

    tracing::info!("Starting seat tracker service");
    tracing::debug!("Storage: {:?}", config.storage);

    seat_tracker::run(config).await?;

    Ok(())
}
