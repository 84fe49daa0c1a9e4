//! Fill ingestion and hyperedge aggregation.
//!
//! This crate handles:
//! - Raw fill file loading
//! - Buyer/seller inference from the cash leg
//! - Undirected hyperedge building (per market and unified)
//! - Directed hyperedge building (transaction and time window)

pub mod classifier;
pub mod directed_builder;
pub mod edge_builder;
pub mod loader;

pub use classifier::{classify, ClassificationStats, TradeClassifier};
pub use directed_builder::{
    build_directed_hyperedges, time_window_hyperedges, transaction_hyperedges,
};
pub use edge_builder::{
    build_market_hyperedges, build_unified_hyperedges, HyperedgeBuilder, HyperedgeSet,
};
pub use loader::{discover_fill_files, load_fills, load_market_fills, load_raw_dir};
