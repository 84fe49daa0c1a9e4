//! Core data types for the hypergraph builder.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Timestamp in seconds since Unix epoch (UTC).
pub type TimestampSecs = i64;

/// Seconds in one UTC calendar day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Asset id marking the stable-value (cash) leg of a fill.
pub const CASH_ASSET_ID: &str = "0";

/// Convert a timestamp to the start of its UTC calendar day.
///
/// Time of day is discarded, never rounded.
#[inline]
pub fn ts_to_day(ts: TimestampSecs) -> TimestampSecs {
    ts.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY
}

/// Convert a timestamp to the start of its window of `window_secs` seconds.
#[inline]
pub fn ts_to_window(ts: TimestampSecs, window_secs: i64) -> TimestampSecs {
    ts.div_euclid(window_secs) * window_secs
}

/// Render a timestamp as a UTC datetime, if it is in chrono's range.
pub fn ts_to_datetime(ts: TimestampSecs) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

/// Normalize a wallet address for use as a node identity.
#[inline]
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// A raw order fill as delivered by the trade-fill subgraph.
///
/// Missing fields deserialize to empty values so that the classifier can
/// reject the record with the fill id in hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    /// Fill id (transaction hash + log index upstream).
    #[serde(default)]
    pub id: String,
    /// Seconds since epoch. The subgraph encodes this as a string.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: TimestampSecs,
    /// Maker wallet address.
    #[serde(default)]
    pub maker: String,
    /// Taker wallet address.
    #[serde(default)]
    pub taker: String,
    /// Asset given by the maker ("0" is cash).
    #[serde(default)]
    pub maker_asset_id: String,
    /// Asset given by the taker ("0" is cash).
    #[serde(default)]
    pub taker_asset_id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Text(String),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<TimestampSecs, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Int(ts) => Ok(ts),
        RawTimestamp::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("invalid timestamp {s:?}"))),
    }
}

/// Fills belonging to one market, tagged with the market slug.
#[derive(Debug, Clone, Default)]
pub struct MarketFills {
    /// Market slug (also the output prefix for per-market datasets).
    pub slug: String,
    /// Fills in arrival order.
    pub fills: Vec<Fill>,
}

impl MarketFills {
    pub fn new(slug: impl Into<String>, fills: Vec<Fill>) -> Self {
        Self {
            slug: slug.into(),
            fills,
        }
    }
}

/// Side of a trader's participation in a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Received the outcome token, paid cash.
    Buy,
    /// Gave the outcome token, received cash.
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fill resolved into buyer and seller roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedTrade {
    /// Id of the originating fill.
    pub fill_id: String,
    /// Normalized buyer address.
    pub buyer: String,
    /// Normalized seller address.
    pub seller: String,
    /// Outcome token that changed hands.
    pub outcome_token: String,
    /// Whether the maker paid cash.
    pub maker_is_buyer: bool,
    /// Timestamp of the fill.
    pub timestamp: TimestampSecs,
    /// Start of the UTC day containing `timestamp`.
    pub day_start: TimestampSecs,
}

impl ClassifiedTrade {
    /// Address participating on the given side.
    #[inline]
    pub fn trader(&self, side: Side) -> &str {
        match side {
            Side::Buy => &self.buyer,
            Side::Sell => &self.seller,
        }
    }

    /// Normalized maker address.
    #[inline]
    pub fn maker(&self) -> &str {
        if self.maker_is_buyer {
            &self.buyer
        } else {
            &self.seller
        }
    }

    /// Normalized taker address.
    #[inline]
    pub fn taker(&self) -> &str {
        if self.maker_is_buyer {
            &self.seller
        } else {
            &self.buyer
        }
    }
}

/// Key of an undirected hyperedge.
///
/// Field order is the output sort order: day, market, outcome, side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HyperedgeKey {
    pub day_start: TimestampSecs,
    pub market: String,
    pub outcome: String,
    pub side: Side,
}

/// Undirected hyperedge: traders on one side of one outcome on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperedge {
    pub key: HyperedgeKey,
    /// Unique participating addresses, ascending.
    pub traders: BTreeSet<String>,
}

impl Hyperedge {
    /// Timestamp written for this edge.
    #[inline]
    pub fn time(&self) -> TimestampSecs {
        self.key.day_start
    }

    /// Number of distinct traders.
    #[inline]
    pub fn len(&self) -> usize {
        self.traders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.traders.is_empty()
    }
}

/// Construction mode for directed hyperedges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectedMode {
    /// One edge per fill, maker to taker.
    #[default]
    Transaction,
    /// Sellers to buyers, grouped by fixed time window.
    TimeWindow,
}

impl DirectedMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectedMode::Transaction => "transaction",
            DirectedMode::TimeWindow => "timewindow",
        }
    }
}

impl fmt::Display for DirectedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed hyperedge from a left (source) set to a right (target) set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectedHyperedge {
    /// Source addresses (maker, or sellers in window).
    pub left: BTreeSet<String>,
    /// Target addresses (taker, or buyers in window).
    pub right: BTreeSet<String>,
    /// Fill timestamp or window start.
    pub time: TimestampSecs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ts_to_day() {
        // 2023-11-14 22:13:20 UTC -> 2023-11-14 00:00:00 UTC
        assert_eq!(ts_to_day(1_700_000_000), 1_699_920_000);
    }

    #[test]
    fn test_day_bucket_boundaries() {
        let day = 1_699_920_000;
        assert_eq!(ts_to_day(day), day);
        assert_eq!(ts_to_day(day + 86_399), day);
        assert_eq!(ts_to_day(day + 86_400), day + 86_400);
    }

    #[test]
    fn test_ts_to_window() {
        assert_eq!(ts_to_window(7_199, 3600), 3600);
        assert_eq!(ts_to_window(7_200, 3600), 7200);
        assert_eq!(ts_to_window(0, 3600), 0);
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address(" 0xAbC "), "0xabc");
    }

    #[test]
    fn test_fill_timestamp_as_string_or_number() {
        let json = r#"[
            {"id":"a","timestamp":"1700000000","maker":"0xA","taker":"0xB",
             "makerAssetId":"0","takerAssetId":"t"},
            {"id":"b","timestamp":1700000001,"maker":"0xA","taker":"0xB",
             "makerAssetId":"0","takerAssetId":"t","transactionHash":"0xff","fee":"0"}
        ]"#;
        let fills: Vec<Fill> = serde_json::from_str(json).unwrap();
        assert_eq!(fills[0].timestamp, 1_700_000_000);
        assert_eq!(fills[1].timestamp, 1_700_000_001);
        assert_eq!(fills[0].maker_asset_id, "0");
    }

    #[test]
    fn test_fill_bad_timestamp_rejected() {
        let json = r#"{"id":"a","timestamp":"soon","maker":"x","taker":"y",
            "makerAssetId":"0","takerAssetId":"t"}"#;
        assert!(serde_json::from_str::<Fill>(json).is_err());
    }

    #[test]
    fn test_fill_missing_fields_default_empty() {
        let fill: Fill = serde_json::from_str(r#"{"id":"a"}"#).unwrap();
        assert_eq!(fill.timestamp, 0);
        assert!(fill.maker.is_empty());
    }

    #[test]
    fn test_hyperedge_key_order() {
        let key = |day, market: &str, outcome: &str, side| HyperedgeKey {
            day_start: day,
            market: market.to_string(),
            outcome: outcome.to_string(),
            side,
        };
        let mut keys = vec![
            key(2, "a", "t1", Side::Buy),
            key(1, "b", "t1", Side::Sell),
            key(1, "b", "t1", Side::Buy),
            key(1, "a", "t2", Side::Buy),
        ];
        keys.sort();
        assert_eq!(keys[0], key(1, "a", "t2", Side::Buy));
        assert_eq!(keys[1], key(1, "b", "t1", Side::Buy));
        assert_eq!(keys[2], key(1, "b", "t1", Side::Sell));
        assert_eq!(keys[3], key(2, "a", "t1", Side::Buy));
    }

    #[test]
    fn test_directed_mode_serde() {
        let mode: DirectedMode = serde_json::from_str("\"timewindow\"").unwrap();
        assert_eq!(mode, DirectedMode::TimeWindow);
        assert_eq!(serde_json::to_string(&DirectedMode::Transaction).unwrap(), "\"transaction\"");
    }
}
