//! Directed hyperedge building.
//!
//! Two constructions:
//! - transaction: one edge per fill, maker to taker, at the fill timestamp
//! - time window: sellers to buyers of each fixed-size window

use crate::classifier::TradeClassifier;
use hypergraph_core::{
    ts_to_window, DirectedHyperedge, DirectedMode, Error, Fill, Result, TimestampSecs,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Build directed hyperedges in the given mode.
pub fn build_directed_hyperedges(
    fills: &[Fill],
    mode: DirectedMode,
    window_secs: i64,
) -> Result<Vec<DirectedHyperedge>> {
    match mode {
        DirectedMode::Transaction => transaction_hyperedges(fills),
        DirectedMode::TimeWindow => time_window_hyperedges(fills, window_secs),
    }
}

/// One hyperedge per fill: left = {maker}, right = {taker}.
///
/// Every fill is still classified, so a fill without a cash leg aborts the
/// dataset here as it does in the undirected form. Edges are ordered by
/// timestamp, ties broken by fill id.
pub fn transaction_hyperedges(fills: &[Fill]) -> Result<Vec<DirectedHyperedge>> {
    if fills.is_empty() {
        return Err(Error::empty_dataset("no fills to convert"));
    }

    let mut classifier = TradeClassifier::new();
    let mut rows: Vec<(TimestampSecs, String, DirectedHyperedge)> =
        Vec::with_capacity(fills.len());

    for fill in fills {
        let trade = classifier.classify(fill)?;
        let edge = DirectedHyperedge {
            left: BTreeSet::from([trade.maker().to_string()]),
            right: BTreeSet::from([trade.taker().to_string()]),
            time: trade.timestamp,
        };
        rows.push((trade.timestamp, trade.fill_id, edge));
    }

    debug!(
        trades = classifier.stats().total_trades,
        maker_buy_frac = classifier.stats().maker_buy_frac(),
        "classified fills"
    );
    rows.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    Ok(rows.into_iter().map(|(_, _, edge)| edge).collect())
}

/// A window being accumulated.
#[derive(Debug, Default)]
struct WindowInProgress {
    sellers: BTreeSet<String>,
    buyers: BTreeSet<String>,
}

/// Sellers to buyers per window of `window_secs` seconds.
///
/// Windows start at `floor(ts / window) * window`. A window produces an edge
/// only when both of its sides are non-empty.
pub fn time_window_hyperedges(fills: &[Fill], window_secs: i64) -> Result<Vec<DirectedHyperedge>> {
    if window_secs <= 0 {
        return Err(Error::config(format!(
            "window must be a positive number of seconds, got {window_secs}"
        )));
    }
    if fills.is_empty() {
        return Err(Error::empty_dataset("no fills to convert"));
    }

    let mut classifier = TradeClassifier::new();
    let mut windows: BTreeMap<TimestampSecs, WindowInProgress> = BTreeMap::new();

    for fill in fills {
        let trade = classifier.classify(fill)?;
        let window = windows
            .entry(ts_to_window(trade.timestamp, window_secs))
            .or_default();
        window.buyers.insert(trade.buyer);
        window.sellers.insert(trade.seller);
    }

    debug!(
        trades = classifier.stats().total_trades,
        windows = windows.len(),
        window_secs,
        "grouped fills into windows"
    );

    Ok(windows
        .into_iter()
        .filter(|(_, w)| !w.sellers.is_empty() && !w.buyers.is_empty())
        .map(|(start, w)| DirectedHyperedge {
            left: w.sellers,
            right: w.buyers,
            time: start,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_fill(
        id: &str,
        ts: i64,
        maker: &str,
        taker: &str,
        maker_asset: &str,
        taker_asset: &str,
    ) -> Fill {
        Fill {
            id: id.to_string(),
            timestamp: ts,
            maker: maker.to_string(),
            taker: taker.to_string(),
            maker_asset_id: maker_asset.to_string(),
            taker_asset_id: taker_asset.to_string(),
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_transaction_mode_maker_to_taker() {
        let fills = vec![
            make_fill("f1", 100, "0xA", "0xB", "0", "t"),
            make_fill("f2", 200, "0xC", "0xA", "t", "0"),
        ];
        let edges = transaction_hyperedges(&fills).unwrap();

        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].left, set(&["0xa"]));
        assert_eq!(edges[0].right, set(&["0xb"]));
        assert_eq!(edges[0].time, 100);
        assert_eq!(edges[1].left, set(&["0xc"]));
        assert_eq!(edges[1].right, set(&["0xa"]));
        assert_eq!(edges[1].time, 200);
    }

    #[test]
    fn test_transaction_mode_sorted_by_time() {
        let fills = vec![
            make_fill("f2", 200, "0xC", "0xD", "0", "t"),
            make_fill("f1", 100, "0xA", "0xB", "0", "t"),
        ];
        let edges = transaction_hyperedges(&fills).unwrap();
        assert_eq!(edges[0].time, 100);
        assert_eq!(edges[1].time, 200);
    }

    #[test]
    fn test_time_window_merges_nearby_fills() {
        let fills = vec![
            make_fill("f1", 7_200, "0xA", "0xB", "0", "t"),
            make_fill("f2", 7_210, "0xC", "0xD", "t", "0"),
            make_fill("f3", 11_200, "0xE", "0xF", "0", "t"),
        ];
        let edges = time_window_hyperedges(&fills, 3600).unwrap();

        assert_eq!(edges.len(), 2);
        // f1: A buys from B; f2: D buys from C.
        assert_eq!(edges[0].left, set(&["0xb", "0xc"]));
        assert_eq!(edges[0].right, set(&["0xa", "0xd"]));
        assert_eq!(edges[0].time, 7_200);
        assert_eq!(edges[1].left, set(&["0xf"]));
        assert_eq!(edges[1].right, set(&["0xe"]));
        assert_eq!(edges[1].time, 10_800);
    }

    #[test]
    fn test_time_window_invalid_window() {
        let fills = vec![make_fill("f1", 100, "0xA", "0xB", "0", "t")];
        assert!(matches!(time_window_hyperedges(&fills, 0), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(transaction_hyperedges(&[]), Err(Error::EmptyDataset(_))));
        assert!(matches!(time_window_hyperedges(&[], 60), Err(Error::EmptyDataset(_))));
    }

    #[test]
    fn test_malformed_fill_aborts_both_modes() {
        let fills = vec![make_fill("bad", 100, "0xA", "0xB", "t", "u")];
        for mode in [DirectedMode::Transaction, DirectedMode::TimeWindow] {
            let err = build_directed_hyperedges(&fills, mode, 3600).unwrap_err();
            assert!(matches!(err, Error::MalformedFill { .. }));
        }
    }
}
