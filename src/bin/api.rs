//! NutriFlex API Server
//!
//! Run with: cargo run --bin nutriflex-api
//!
//! # Configuration
//!
//! Read from `NUTRIFLEX_CONFIG`, `<config dir>/nutriflex/config.toml` or
//! `./nutriflex.toml`, in that order, then overridden by:
//! - `NUTRIFLEX_DATA_DIR`: Data directory (default: <local data dir>/nutriflex)
//! - `NUTRIFLEX_API_HOST`: Host to bind to (default: 127.0.0.1)
//! - `NUTRIFLEX_API_PORT`: Port to listen on (default: 8086)
//! - `NUTRIFLEX_LOG_LEVEL`, `NUTRIFLEX_LOG_FORMAT`, `NUTRIFLEX_LOG_FILE`
//! - `RUST_LOG`: Log filter, wins over the configured level

use anyhow::Context;
use nutriflex::api::{serve, AppState};
use nutriflex::config::Config;
use nutriflex::logging;
use nutriflex::storage::FileStore;
use nutriflex::tracker::{SystemClock, Tracker};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    logging::init(&config.logging)?;

    tracing::info!("Starting NutriFlex API server v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.storage.data_path();
    tracing::info!("Data directory: {:?}", data_dir);

    let store = FileStore::open(data_dir.clone())
        .with_context(|| format!("Failed to open data directory {:?}", data_dir))?;

    let tracker = Arc::new(Tracker::new(
        Arc::new(store),
        Arc::new(SystemClock),
        config.scoring.clone(),
    ));

    let report = tracker.init().context("Failed to initialize tracker state")?;
    if !report.seeded.is_empty() {
        tracing::info!(keys = ?report.seeded, "Seeded default collections");
    }
    if !report.recovered.is_empty() {
        tracing::warn!(
            keys = ?report.recovered,
            "Corrupt collections were reset to defaults; restore a backup to recover them"
        );
    }

    let state = AppState::new(tracker, config.api.clone());
    serve(state, &config.api).await?;

    tracing::info!("NutriFlex API server stopped");
    Ok(())
}
