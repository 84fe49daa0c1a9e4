//! Error types for the hypergraph builder.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the hypergraph builder.
#[derive(Error, Debug)]
pub enum Error {
    /// A fill that cannot be classified into buyer and seller.
    #[error("Malformed fill {fill_id}{}: {reason}", market_suffix(.market))]
    MalformedFill {
        fill_id: String,
        market: Option<String>,
        reason: String,
    },

    /// No fills for the requested scope.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// A cross-file invariant would be violated by the rendered output.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Failure reported by the data-acquisition collaborator.
    #[error("Upstream fetch failed for {market}: {message}")]
    UpstreamFetch { market: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An input file could not be read or parsed.
    #[error("Failed to load {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn market_suffix(market: &Option<String>) -> String {
    match market {
        Some(slug) => format!(" in market {slug}"),
        None => String::new(),
    }
}

impl Error {
    /// Create a malformed fill error with no market attached yet.
    pub fn malformed_fill(fill_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedFill {
            fill_id: fill_id.into(),
            market: None,
            reason: reason.into(),
        }
    }

    /// Create an empty dataset error.
    pub fn empty_dataset(msg: impl Into<String>) -> Self {
        Error::EmptyDataset(msg.into())
    }

    /// Create an integrity error.
    pub fn integrity(msg: impl Into<String>) -> Self {
        Error::Integrity(msg.into())
    }

    /// Create an upstream fetch error.
    pub fn upstream_fetch(market: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UpstreamFetch {
            market: market.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a load error for the given file.
    pub fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Attach a market slug to a malformed fill error.
    ///
    /// Other variants are returned unchanged, as is a malformed fill that
    /// already names its market.
    pub fn in_market(self, slug: &str) -> Self {
        match self {
            Error::MalformedFill {
                fill_id,
                market: None,
                reason,
            } => Error::MalformedFill {
                fill_id,
                market: Some(slug.to_string()),
                reason,
            },
            other => other,
        }
    }
}
