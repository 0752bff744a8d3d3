use anyhow::Result;
use api_stats_service::{config, server};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads configuration and runs the server until shutdown.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting API Stats Service...".green());

    let cfg = config::load_config(config_path)?;

    info!("Configuration loaded from {}", config_path.display());

    // Start the server (blocks until shutdown)
    server::start_server(cfg).await?;

    Ok(())
}
