//! Deterministic node identities.
//!
//! Addresses are sorted lexicographically and numbered from a base id, so the
//! mapping depends only on the set of addresses, never on fill order.

use hypergraph_core::{DirectedHyperedge, Hyperedge};
use std::collections::BTreeSet;

/// First id of the undirected (congress-bills) format.
pub const UNDIRECTED_BASE_ID: usize = 1;

/// First id of the directed bipartite format.
pub const DIRECTED_BASE_ID: usize = 0;

/// Bijection between trader addresses and dense integer ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIndex {
    /// Sorted, unique addresses. Position `i` holds id `base + i`.
    labels: Vec<String>,
    base: usize,
}

impl NodeIndex {
    /// Build an index over any collection of addresses.
    pub fn new<I, S>(addresses: I, base: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = addresses.into_iter().map(Into::into).collect();
        Self {
            labels: unique.into_iter().collect(),
            base,
        }
    }

    /// Index every address referenced by an undirected edge.
    pub fn from_hyperedges(edges: &[Hyperedge]) -> Self {
        Self::new(
            edges.iter().flat_map(|e| e.traders.iter().cloned()),
            UNDIRECTED_BASE_ID,
        )
    }

    /// Index every address referenced by a directed edge.
    pub fn from_directed(edges: &[DirectedHyperedge]) -> Self {
        Self::new(
            edges
                .iter()
                .flat_map(|e| e.left.iter().chain(e.right.iter()).cloned()),
            DIRECTED_BASE_ID,
        )
    }

    /// Id of an address.
    pub fn id(&self, address: &str) -> Option<usize> {
        self.labels
            .binary_search_by(|label| label.as_str().cmp(address))
            .ok()
            .map(|pos| pos + self.base)
    }

    /// Addresses in id order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
