//! End-to-end dataset generation.
//!
//! This crate handles:
//! - Market slug parsing from slugs or URLs
//! - Per-market, unified and directed runs over raw fills files
//! - Batches of markets with per-market isolation

pub mod batch;
pub mod orchestrator;
pub mod slug;

pub use batch::{run_batch, BatchReport};
pub use orchestrator::{
    generate_all, process_market, run_directed, run_market, run_unified, FillSummary,
    GenerateReport, MarketDataset, MarketOutcome, ProcessReport, StageResult,
};
pub use slug::parse_market_slug;
