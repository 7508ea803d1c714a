//! Logging setup
//!
//! Installs the global `tracing` subscriber from [`LoggingConfig`]:
//! `pretty` or `json` output on stdout, plus an optional plain-text log file.
//! `RUST_LOG`, when set, takes precedence over the configured level.

use crate::config::LoggingConfig;
use anyhow::Context;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Filter from `RUST_LOG` or the configured level, with HTTP client noise trimmed
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let base = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());
    let filter = EnvFilter::try_new(&base).unwrap_or_else(|e| {
        eprintln!("Invalid log filter '{}' ({}), falling back to info", base, e);
        EnvFilter::new("info")
    });

    match "hyper=warn".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

fn build_layers(config: &LoggingConfig) -> anyhow::Result<Vec<BoxedLayer>> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let stdout: BoxedLayer = match config.format.as_str() {
        "json" => fmt::layer().with_target(true).json().boxed(),
        _ => fmt::layer().with_target(true).boxed(),
    };
    layers.push(stdout);

    if let Some(path) = &config.file {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path))?;

        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed(),
        );
    }

    Ok(layers)
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let layers = build_layers(config)?;

    tracing_subscriber::registry()
        .with(layers)
        .with(build_filter(config))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        level = %config.level,
        format = %config.format,
        file = ?config.file,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_layer_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("nutriflex.log");
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
            file: Some(path.to_string_lossy().to_string()),
        };

        let layers = build_layers(&config).unwrap();
        assert_eq!(layers.len(), 2);
        assert!(path.exists());
    }

    #[test]
    fn test_stdout_only_by_default() {
        let layers = build_layers(&LoggingConfig::default()).unwrap();
        assert_eq!(layers.len(), 1);
    }
}
