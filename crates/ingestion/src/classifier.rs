//! Trade side inference from the cash leg of a fill.
//!
//! The party handing over the cash asset is the buyer of the outcome token,
//! the party handing over the outcome token is the seller.

use hypergraph_core::{
    normalize_address, ts_to_day, ClassifiedTrade, Error, Fill, Result, CASH_ASSET_ID,
};

/// Statistics about trade classification.
#[derive(Debug, Clone, Default)]
pub struct ClassificationStats {
    /// Total fills classified successfully.
    pub total_trades: u64,
    /// Fills where the maker paid cash.
    pub maker_buys: u64,
    /// Fills where the taker paid cash.
    pub taker_buys: u64,
    /// Fills rejected as malformed.
    pub rejected: u64,
}

impl ClassificationStats {
    /// Fraction of trades where the maker was the buyer.
    pub fn maker_buy_frac(&self) -> f64 {
        if self.total_trades > 0 {
            self.maker_buys as f64 / self.total_trades as f64
        } else {
            0.0
        }
    }
}

fn display_id(fill: &Fill) -> &str {
    if fill.id.is_empty() {
        "<missing id>"
    } else {
        &fill.id
    }
}

/// Classify a single fill into buyer, seller, outcome token and UTC day.
///
/// Addresses are lowercased here and nowhere else.
pub fn classify(fill: &Fill) -> Result<ClassifiedTrade> {
    let id = display_id(fill);
    let reject = |reason: String| Error::malformed_fill(id, reason);

    if fill.id.is_empty() {
        return Err(reject("missing id".to_string()));
    }
    if fill.timestamp <= 0 {
        return Err(reject(format!(
            "missing or non-positive timestamp {}",
            fill.timestamp
        )));
    }

    let maker = normalize_address(&fill.maker);
    let taker = normalize_address(&fill.taker);
    if maker.is_empty() {
        return Err(reject("missing maker".to_string()));
    }
    if taker.is_empty() {
        return Err(reject("missing taker".to_string()));
    }
    if maker == taker {
        return Err(reject(format!("maker and taker are the same address {maker}")));
    }

    let maker_asset = fill.maker_asset_id.trim();
    let taker_asset = fill.taker_asset_id.trim();
    if maker_asset.is_empty() || taker_asset.is_empty() {
        return Err(reject("missing makerAssetId or takerAssetId".to_string()));
    }

    let (buyer, seller, outcome_token, maker_is_buyer) =
        match (maker_asset == CASH_ASSET_ID, taker_asset == CASH_ASSET_ID) {
            // Maker pays cash, receives the taker's outcome token.
            (true, false) => (maker, taker, taker_asset, true),
            // Taker pays cash, receives the maker's outcome token.
            (false, true) => (taker, maker, maker_asset, false),
            (true, true) => {
                return Err(reject("both legs are the cash asset".to_string()));
            }
            (false, false) => {
                return Err(reject(format!(
                    "no cash leg (makerAssetId={maker_asset}, takerAssetId={taker_asset})"
                )));
            }
        };

    Ok(ClassifiedTrade {
        fill_id: fill.id.clone(),
        buyer,
        seller,
        outcome_token: outcome_token.to_string(),
        maker_is_buyer,
        timestamp: fill.timestamp,
        day_start: ts_to_day(fill.timestamp),
    })
}

/// Trade classifier that keeps running statistics.
#[derive(Debug, Default)]
pub struct TradeClassifier {
    stats: ClassificationStats,
}

impl TradeClassifier {
    /// Create a new trade classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a single fill.
    pub fn classify(&mut self, fill: &Fill) -> Result<ClassifiedTrade> {
        match classify(fill) {
            Ok(trade) => {
                self.stats.total_trades += 1;
                if trade.maker_is_buyer {
                    self.stats.maker_buys += 1;
                } else {
                    self.stats.taker_buys += 1;
                }
                Ok(trade)
            }
            Err(e) => {
                self.stats.rejected += 1;
                Err(e)
            }
        }
    }

    /// Get classification statistics.
    pub fn stats(&self) -> &ClassificationStats {
        &self.stats
    }
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

    #[test]
    fn test_maker_pays_cash() {
        let fill = make_fill("f1", 1_700_000_000, "0xA", "0xB", "0", "tok1");
        let trade = classify(&fill).unwrap();

        assert_eq!(trade.buyer, "0xa");
        assert_eq!(trade.seller, "0xb");
        assert_eq!(trade.outcome_token, "tok1");
        assert_eq!(trade.day_start, 1_699_920_000);
        assert_eq!(trade.maker(), "0xa");
        assert_eq!(trade.taker(), "0xb");
    }

    #[test]
    fn test_taker_pays_cash() {
        let fill = make_fill("f1", 1_700_000_000, "0xA", "0xB", "tok1", "0");
        let trade = classify(&fill).unwrap();

        assert_eq!(trade.buyer, "0xb");
        assert_eq!(trade.seller, "0xa");
        assert_eq!(trade.outcome_token, "tok1");
        assert_eq!(trade.maker(), "0xa");
        assert_eq!(trade.taker(), "0xb");
    }

    #[test]
    fn test_roles_cover_maker_and_taker() {
        let fills = [
            make_fill("f1", 10, "0xA", "0xB", "0", "t"),
            make_fill("f2", 20, "0xC", "0xd", "t", "0"),
        ];
        for fill in &fills {
            let trade = classify(fill).unwrap();
            assert_ne!(trade.buyer, trade.seller);
            let mut roles = [trade.buyer.clone(), trade.seller.clone()];
            roles.sort();
            let mut parties = [fill.maker.to_lowercase(), fill.taker.to_lowercase()];
            parties.sort();
            assert_eq!(roles, parties);
        }
    }

    #[test]
    fn test_no_cash_leg_is_malformed() {
        let fill = make_fill("bad", 10, "0xA", "0xB", "tok1", "tok2");
        let err = classify(&fill).unwrap_err();
        match err {
            Error::MalformedFill { fill_id, .. } => assert_eq!(fill_id, "bad"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_both_cash_legs_is_malformed() {
        let fill = make_fill("bad", 10, "0xA", "0xB", "0", "0");
        assert!(matches!(classify(&fill), Err(Error::MalformedFill { .. })));
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let fill = make_fill("f", 10, "", "0xB", "0", "t");
        assert!(matches!(classify(&fill), Err(Error::MalformedFill { .. })));

        let fill = make_fill("f", 0, "0xA", "0xB", "0", "t");
        assert!(matches!(classify(&fill), Err(Error::MalformedFill { .. })));

        let fill = make_fill("", 10, "0xA", "0xB", "0", "t");
        let msg = classify(&fill).unwrap_err().to_string();
        assert!(msg.contains("<missing id>"));
    }

    #[test]
    fn test_self_trade_is_malformed() {
        let fill = make_fill("f", 10, "0xAA", "0xaa", "0", "t");
        assert!(matches!(classify(&fill), Err(Error::MalformedFill { .. })));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let fill = make_fill("f1", 1_700_000_000, "0xA", "0xB", "tok1", "0");
        assert_eq!(classify(&fill).unwrap(), classify(&fill).unwrap());
    }

    #[test]
    fn test_stats() {
        let mut classifier = TradeClassifier::new();
        classifier.classify(&make_fill("a", 10, "0xA", "0xB", "0", "t")).unwrap();
        classifier.classify(&make_fill("b", 10, "0xA", "0xB", "t", "0")).unwrap();
        classifier.classify(&make_fill("c", 10, "0xA", "0xB", "0", "t")).unwrap();
        assert!(classifier.classify(&make_fill("d", 10, "0xA", "0xB", "t", "t")).is_err());

        let stats = classifier.stats();
        assert_eq!(stats.total_trades, 3);
        assert_eq!(stats.maker_buys, 2);
        assert_eq!(stats.taker_buys, 1);
        assert_eq!(stats.rejected, 1);
        assert!((stats.maker_buy_frac() - 2.0 / 3.0).abs() < 1e-10);
    }
}
