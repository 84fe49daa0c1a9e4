//! Configuration structures for the hypergraph builder.

use crate::error::{Error, Result};
use crate::types::DirectedMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the hypergraph builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Output naming.
    pub output: OutputConfig,
    /// Directed converter configuration.
    pub directed: DirectedConfig,
    /// Batch processing configuration.
    pub batch: BatchConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections keep defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| {
            Error::config(format!("invalid config file {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail deep inside a run.
    pub fn validate(&self) -> Result<()> {
        if self.directed.window_seconds <= 0 {
            return Err(Error::config(format!(
                "directed.window_seconds must be positive, got {}",
                self.directed.window_seconds
            )));
        }
        if self.output.unified_prefix.trim().is_empty() {
            return Err(Error::config("output.unified_prefix must not be empty"));
        }
        Ok(())
    }
}

/// Directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `fills_<slug>.json` files.
    pub raw_dir: PathBuf,
    /// Output directory of the unified dataset.
    pub unified_dir: PathBuf,
    /// Parent directory of per-market dataset directories.
    pub by_market_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            unified_dir: PathBuf::from("data/hypergraphs/unified"),
            by_market_dir: PathBuf::from("data/hypergraphs/by-market"),
        }
    }
}

/// Check that a market slug is a single plain path component.
///
/// Slugs name both the raw fills file and the per-market output directory.
pub fn validate_market_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(Error::config("empty market slug"));
    }
    if slug == "." || slug == ".." || slug.contains(['/', '\\', '\0']) {
        return Err(Error::config(format!(
            "market slug {slug:?} is not a plain file name"
        )));
    }
    Ok(())
}

impl PathsConfig {
    /// Output directory for one market's dataset.
    pub fn market_dir(&self, slug: &str) -> PathBuf {
        self.by_market_dir.join(slug)
    }

    /// Raw fills file for one market.
    pub fn fills_file(&self, slug: &str) -> PathBuf {
        self.raw_dir.join(format!("fills_{slug}.json"))
    }
}

/// Output naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File prefix of the unified dataset.
    pub unified_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            unified_prefix: "polymarket-unified".to_string(),
        }
    }
}

/// Directed converter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectedConfig {
    /// Construction mode.
    pub mode: DirectedMode,
    /// Window size in seconds (time-window mode only).
    pub window_seconds: i64,
}

impl Default for DirectedConfig {
    fn default() -> Self {
        Self {
            mode: DirectedMode::Transaction,
            window_seconds: 3600,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of parallel workers (0 = auto, 1 = sequential).
    pub workers: u32,
    /// Stop starting new markets after this many seconds.
    pub deadline_secs: Option<u64>,
    /// Regenerate the unified dataset after the batch.
    pub refresh_unified: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            deadline_secs: None,
            refresh_unified: true,
        }
    }
}
