//! Undirected hypergraph output in the congress-bills layout.
//!
//! Four companion files per dataset prefix `P`:
//! - `P-node-labels.txt`: address of node id `i` on line `i` (1-indexed)
//! - `P-nverts.txt`: size of each hyperedge
//! - `P-simplices.txt`: node ids of all hyperedges, flattened in edge order
//! - `P-times.txt`: day-start timestamp of each hyperedge

use crate::node_ids::NodeIndex;
use crate::staging::StagedFileSet;
use hypergraph_core::{Error, Hyperedge, Result, TimestampSecs};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Parallel arrays of an undirected dataset, before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CongressArrays {
    /// Addresses in id order.
    pub labels: Vec<String>,
    /// Size of each edge.
    pub nverts: Vec<usize>,
    /// Concatenated node ids, ascending within each edge.
    pub simplices: Vec<usize>,
    /// Timestamp of each edge.
    pub times: Vec<TimestampSecs>,
}

impl CongressArrays {
    /// Map hyperedges through the node index.
    pub fn build(edges: &[Hyperedge], index: &NodeIndex) -> Result<Self> {
        let mut arrays = CongressArrays {
            labels: index.labels().to_vec(),
            nverts: Vec::with_capacity(edges.len()),
            simplices: Vec::new(),
            times: Vec::with_capacity(edges.len()),
        };

        for edge in edges {
            let mut ids = edge
                .traders
                .iter()
                .map(|address| {
                    index.id(address).ok_or_else(|| {
                        Error::integrity(format!(
                            "address {address} of edge ({}, {}, {}, {}) has no node id",
                            edge.key.day_start, edge.key.market, edge.key.outcome, edge.key.side
                        ))
                    })
                })
                .collect::<Result<Vec<usize>>>()?;
            ids.sort_unstable();

            arrays.nverts.push(ids.len());
            arrays.times.push(edge.time());
            arrays.simplices.extend(ids);
        }

        Ok(arrays)
    }

    /// Check every cross-file invariant.
    pub fn validate(&self) -> Result<()> {
        if self.nverts.len() != self.times.len() {
            return Err(Error::integrity(format!(
                "{} edge sizes but {} edge times",
                self.nverts.len(),
                self.times.len()
            )));
        }

        let total: usize = self.nverts.iter().sum();
        if total != self.simplices.len() {
            return Err(Error::integrity(format!(
                "edge sizes sum to {total} but simplices list has {} entries",
                self.simplices.len()
            )));
        }

        let mut offset = 0;
        for (edge, &size) in self.nverts.iter().enumerate() {
            if size == 0 {
                return Err(Error::integrity(format!("edge {edge} is empty")));
            }
            let ids = &self.simplices[offset..offset + size];
            if let Some(&bad) = ids.iter().find(|&&id| id == 0 || id > self.labels.len()) {
                return Err(Error::integrity(format!(
                    "edge {edge} references node id {bad} outside 1..={}",
                    self.labels.len()
                )));
            }
            if ids.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(Error::integrity(format!(
                    "node ids of edge {edge} are not strictly ascending"
                )));
            }
            offset += size;
        }

        Ok(())
    }

    /// Render the four files, keyed by file name.
    pub fn render(&self, prefix: &str) -> Vec<(String, String)> {
        vec![
            (labels_file(prefix), lines(&self.labels)),
            (nverts_file(prefix), lines(&self.nverts)),
            (simplices_file(prefix), lines(&self.simplices)),
            (times_file(prefix), lines(&self.times)),
        ]
    }
}

fn lines<T: std::fmt::Display>(values: &[T]) -> String {
    let mut out = String::new();
    for value in values {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{value}");
    }
    out
}

fn labels_file(prefix: &str) -> String {
    format!("{prefix}-node-labels.txt")
}

fn nverts_file(prefix: &str) -> String {
    format!("{prefix}-nverts.txt")
}

fn simplices_file(prefix: &str) -> String {
    format!("{prefix}-simplices.txt")
}

fn times_file(prefix: &str) -> String {
    format!("{prefix}-times.txt")
}

/// Paths of a written undirected dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CongressFiles {
    pub node_labels: PathBuf,
    pub nverts: PathBuf,
    pub simplices: PathBuf,
    pub times: PathBuf,
}

/// Statistics of a written undirected dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CongressStats {
    /// Number of distinct traders.
    pub nodes: usize,
    /// Number of hyperedges.
    pub hyperedges: usize,
    /// Sum of hyperedge sizes.
    pub total_vertex_occurrences: usize,
    /// Output directory.
    pub output_dir: PathBuf,
    /// Written files.
    pub files: CongressFiles,
}

/// Write an undirected dataset to `output_dir` with file prefix `prefix`.
///
/// Nothing is written unless the whole dataset passes validation.
pub fn write_congress_dataset(
    edges: &[Hyperedge],
    output_dir: impl AsRef<Path>,
    prefix: &str,
) -> Result<CongressStats> {
    let output_dir = output_dir.as_ref();
    if edges.is_empty() {
        return Err(Error::empty_dataset(format!("no hyperedges for {prefix}")));
    }

    let index = NodeIndex::from_hyperedges(edges);
    let arrays = CongressArrays::build(edges, &index)?;
    arrays.validate()?;

    let mut staged = StagedFileSet::new(output_dir);
    for (name, contents) in arrays.render(prefix) {
        staged.add(name, contents);
    }
    let files = CongressFiles {
        node_labels: staged.path_of(&labels_file(prefix)),
        nverts: staged.path_of(&nverts_file(prefix)),
        simplices: staged.path_of(&simplices_file(prefix)),
        times: staged.path_of(&times_file(prefix)),
    };
    staged.commit()?;

    let stats = CongressStats {
        nodes: index.len(),
        hyperedges: arrays.nverts.len(),
        total_vertex_occurrences: arrays.simplices.len(),
        output_dir: output_dir.to_path_buf(),
        files,
    };
    info!(
        prefix,
        dir = %output_dir.display(),
        nodes = stats.nodes,
        hyperedges = stats.hyperedges,
        vertex_occurrences = stats.total_vertex_occurrences,
        "wrote undirected hypergraph"
    );
    Ok(stats)
}
