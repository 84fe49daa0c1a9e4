//! Hypergraph dataset writers.
//!
//! This crate handles:
//! - Deterministic node id assignment
//! - Undirected datasets (congress-bills layout, 1-indexed)
//! - Directed datasets (bipartite train lists, 0-indexed)
//! - Staged, all-or-nothing file writes

pub mod congress;
pub mod directed;
pub mod node_ids;
pub mod staging;

pub use congress::{write_congress_dataset, CongressArrays, CongressFiles, CongressStats};
pub use directed::{write_directed_dataset, DirectedArrays, DirectedStats, SizeSummary};
pub use node_ids::{NodeIndex, DIRECTED_BASE_ID, UNDIRECTED_BASE_ID};
pub use staging::StagedFileSet;
