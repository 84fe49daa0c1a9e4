//! Shared setup for the command-line tools.

use anyhow::{Context, Result};
use hypergraph_core::Config;
use std::path::Path;

/// Install the global log subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Logs go to stderr so reports on stdout stay machine-readable.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Load the configuration file if one was given, else the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}
