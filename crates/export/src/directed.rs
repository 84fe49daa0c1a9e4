//! Directed hypergraph output in the bipartite train-list layout.
//!
//! `p_k_list_train.txt` holds the left side of each edge, `p_a_list_train.txt`
//! the right side, and `times.txt` the edge time. The three files share one
//! 0-based edge index.

use crate::node_ids::NodeIndex;
use crate::staging::StagedFileSet;
use hypergraph_core::{DirectedHyperedge, Error, Result, TimestampSecs};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

pub const LEFT_FILE: &str = "p_k_list_train.txt";
pub const RIGHT_FILE: &str = "p_a_list_train.txt";
pub const TIMES_FILE: &str = "times.txt";

/// Rendered lines of a directed dataset, before writing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectedArrays {
    /// Number of indexed nodes.
    pub node_count: usize,
    /// Left node ids per edge.
    pub left: Vec<Vec<usize>>,
    /// Right node ids per edge.
    pub right: Vec<Vec<usize>>,
    /// Time per edge.
    pub times: Vec<TimestampSecs>,
}

impl DirectedArrays {
    pub fn build(edges: &[DirectedHyperedge], index: &NodeIndex) -> Result<Self> {
        let lookup = |side: &std::collections::BTreeSet<String>, edge: usize| {
            side.iter()
                .map(|address| {
                    index.id(address).ok_or_else(|| {
                        Error::integrity(format!("address {address} of edge {edge} has no node id"))
                    })
                })
                .collect::<Result<Vec<usize>>>()
        };

        let mut arrays = DirectedArrays {
            node_count: index.len(),
            left: Vec::with_capacity(edges.len()),
            right: Vec::with_capacity(edges.len()),
            times: Vec::with_capacity(edges.len()),
        };
        for (i, edge) in edges.iter().enumerate() {
            arrays.left.push(lookup(&edge.left, i)?);
            arrays.right.push(lookup(&edge.right, i)?);
            arrays.times.push(edge.time);
        }
        Ok(arrays)
    }

    /// Check that the three files line up and every id is indexed.
    pub fn validate(&self) -> Result<()> {
        let n = self.times.len();
        if self.left.len() != n || self.right.len() != n {
            return Err(Error::integrity(format!(
                "record counts differ: {} left, {} right, {} times",
                self.left.len(),
                self.right.len(),
                n
            )));
        }

        for (edge, (left, right)) in self.left.iter().zip(&self.right).enumerate() {
            if left.is_empty() || right.is_empty() {
                return Err(Error::integrity(format!("edge {edge} has an empty side")));
            }
            if let Some(&bad) = left.iter().chain(right).find(|&&id| id >= self.node_count) {
                return Err(Error::integrity(format!(
                    "edge {edge} references node id {bad} outside 0..{}",
                    self.node_count
                )));
            }
        }

        Ok(())
    }

    /// Render the three files, keyed by file name.
    pub fn render(&self) -> Vec<(String, String)> {
        let mut left = String::new();
        let mut right = String::new();
        let mut times = String::new();
        // Writing to a String cannot fail.
        for (idx, ((l, r), t)) in self.left.iter().zip(&self.right).zip(&self.times).enumerate() {
            let _ = writeln!(left, "{idx}:{}", join_ids(l));
            let _ = writeln!(right, "{idx}:{}", join_ids(r));
            let _ = writeln!(times, "{idx}\t{:.1}", *t as f64);
        }
        vec![
            (LEFT_FILE.to_string(), left),
            (RIGHT_FILE.to_string(), right),
            (TIMES_FILE.to_string(), times),
        ]
    }
}

fn join_ids(ids: &[usize]) -> String {
    ids.iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Min, max and mean of a list of edge side sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeSummary {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

impl SizeSummary {
    pub fn from_sizes(sizes: &[usize]) -> Option<Self> {
        let min = *sizes.iter().min()?;
        let max = *sizes.iter().max()?;
        let as_f64: Vec<f64> = sizes.iter().map(|&s| s as f64).collect();
        Some(Self {
            min,
            max,
            mean: statrs::statistics::Statistics::mean(&as_f64),
        })
    }
}

/// Statistics of a written directed dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectedStats {
    pub nodes: usize,
    pub hyperedges: usize,
    pub left_size: SizeSummary,
    pub right_size: SizeSummary,
    pub output_dir: PathBuf,
}

/// Write a directed dataset into `output_dir`.
///
/// Nothing is written unless the whole dataset passes validation.
pub fn write_directed_dataset(
    edges: &[DirectedHyperedge],
    output_dir: impl AsRef<Path>,
) -> Result<DirectedStats> {
    let output_dir = output_dir.as_ref();
    let index = NodeIndex::from_directed(edges);
    let arrays = DirectedArrays::build(edges, &index)?;
    arrays.validate()?;

    let left_sizes: Vec<usize> = arrays.left.iter().map(Vec::len).collect();
    let right_sizes: Vec<usize> = arrays.right.iter().map(Vec::len).collect();
    let (Some(left_size), Some(right_size)) = (
        SizeSummary::from_sizes(&left_sizes),
        SizeSummary::from_sizes(&right_sizes),
    ) else {
        return Err(Error::empty_dataset(format!(
            "no directed hyperedges for {}",
            output_dir.display()
        )));
    };

    let mut staged = StagedFileSet::new(output_dir);
    for (name, contents) in arrays.render() {
        staged.add(name, contents);
    }
    staged.commit()?;

    let stats = DirectedStats {
        nodes: index.len(),
        hyperedges: arrays.times.len(),
        left_size,
        right_size,
        output_dir: output_dir.to_path_buf(),
    };
    info!(
        dir = %output_dir.display(),
        nodes = stats.nodes,
        hyperedges = stats.hyperedges,
        left_mean = stats.left_size.mean,
        right_mean = stats.right_size.mean,
        "wrote directed hypergraph"
    );
    Ok(stats)
}
