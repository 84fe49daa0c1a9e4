//! Core types and configuration for the hypergraph builder.
//!
//! This crate provides shared types used across all other crates:
//! - Raw fills and classified trades
//! - Hyperedge keys and sides
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{validate_market_slug, Config};
pub use error::{Error, Result};
pub use types::*;
