//! Undirected hyperedge building from classified trades.
//!
//! Groups traders by (day, market, outcome token, side). Membership records
//! participation only, so repeated trades by one trader in a bucket collapse.

use crate::classifier::{ClassificationStats, TradeClassifier};
use hypergraph_core::{
    ClassifiedTrade, Error, Fill, Hyperedge, HyperedgeKey, MarketFills, Result, Side,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Hyperedges of one dataset plus every trader they reference.
#[derive(Debug, Clone, Default)]
pub struct HyperedgeSet {
    /// Edges sorted by key.
    pub edges: Vec<Hyperedge>,
    /// All addresses appearing in any edge.
    pub traders: BTreeSet<String>,
    /// Markets that contributed fills.
    pub markets: Vec<String>,
    /// Number of fills aggregated.
    pub fill_count: usize,
}

impl HyperedgeSet {
    /// Sum of edge sizes.
    pub fn total_vertex_occurrences(&self) -> usize {
        self.edges.iter().map(Hyperedge::len).sum()
    }
}

/// Builder for undirected hyperedges.
#[derive(Debug, Default)]
pub struct HyperedgeBuilder {
    /// Members per key, kept ordered so output order needs no extra sort.
    edges: BTreeMap<HyperedgeKey, BTreeSet<String>>,
    /// Classifier shared across all added fills.
    classifier: TradeClassifier,
    /// Markets seen, in first-seen order.
    markets: Vec<String>,
    fill_count: usize,
}

impl HyperedgeBuilder {
    /// Create a new hyperedge builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a classified trade of the given market.
    pub fn add_trade(&mut self, market: &str, trade: &ClassifiedTrade) {
        for side in [Side::Buy, Side::Sell] {
            let key = HyperedgeKey {
                day_start: trade.day_start,
                market: market.to_string(),
                outcome: trade.outcome_token.clone(),
                side,
            };
            self.edges
                .entry(key)
                .or_default()
                .insert(trade.trader(side).to_string());
        }
    }

    /// Classify and add a single fill.
    pub fn add_fill(&mut self, market: &str, fill: &Fill) -> Result<()> {
        let trade = self
            .classifier
            .classify(fill)
            .map_err(|e| e.in_market(market))?;
        self.add_trade(market, &trade);
        self.fill_count += 1;
        Ok(())
    }

    /// Add every fill of a market, aborting on the first malformed fill.
    pub fn add_market(&mut self, market: &MarketFills) -> Result<()> {
        if !self.markets.iter().any(|m| m == &market.slug) {
            self.markets.push(market.slug.clone());
        }
        for fill in &market.fills {
            self.add_fill(&market.slug, fill)?;
        }
        debug!(
            market = %market.slug,
            fills = market.fills.len(),
            buckets = self.pending_edge_count(),
            "aggregated market fills"
        );
        Ok(())
    }

    /// Number of distinct hyperedge keys so far.
    pub fn pending_edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get classification statistics.
    pub fn stats(&self) -> &ClassificationStats {
        self.classifier.stats()
    }

    /// Finalize into a sorted hyperedge set.
    ///
    /// `scope` names the dataset in the error raised when no fill was added.
    pub fn finish(self, scope: &str) -> Result<HyperedgeSet> {
        if self.fill_count == 0 {
            return Err(Error::empty_dataset(format!("no fills to process for {scope}")));
        }

        let mut traders = BTreeSet::new();
        let edges: Vec<Hyperedge> = self
            .edges
            .into_iter()
            .map(|(key, members)| {
                traders.extend(members.iter().cloned());
                Hyperedge {
                    key,
                    traders: members,
                }
            })
            .collect();

        Ok(HyperedgeSet {
            edges,
            traders,
            markets: self.markets,
            fill_count: self.fill_count,
        })
    }
}

/// Build the hyperedges of a single market.
pub fn build_market_hyperedges(market: &MarketFills) -> Result<HyperedgeSet> {
    let mut builder = HyperedgeBuilder::new();
    builder.add_market(market)?;
    log_classification(&market.slug, builder.stats());
    builder.finish(&format!("market {}", market.slug))
}

/// Build hyperedges across all markets. Keys keep the market slug, so one
/// token traded on two markets yields separate edges.
pub fn build_unified_hyperedges(markets: &[MarketFills]) -> Result<HyperedgeSet> {
    let mut builder = HyperedgeBuilder::new();
    for market in markets {
        builder.add_market(market)?;
    }
    log_classification("unified", builder.stats());
    builder.finish("unified dataset")
}

fn log_classification(scope: &str, stats: &ClassificationStats) {
    debug!(
        scope,
        trades = stats.total_trades,
        maker_buy_frac = stats.maker_buy_frac(),
        "classified fills"
    );
}
