//! Raw fill files.
//!
//! Fills are stored as one JSON array per market, named `fills_<slug>.json`.

use hypergraph_core::{Error, Fill, MarketFills, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const FILE_PREFIX: &str = "fills_";
const FILE_SUFFIX: &str = ".json";

/// Market slug encoded in a raw fills file name, if it follows the convention.
pub fn slug_from_file_name(name: &str) -> Option<&str> {
    let slug = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Raw fills file name for a market slug.
pub fn file_name_for_slug(slug: &str) -> String {
    format!("{FILE_PREFIX}{slug}{FILE_SUFFIX}")
}

/// Load a JSON array of fills.
pub fn load_fills(path: impl AsRef<Path>) -> Result<Vec<Fill>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
    serde_json::from_str(&raw).map_err(|e| Error::load(path, e))
}

/// Load one market's fills, tagged with its slug.
pub fn load_market_fills(path: impl AsRef<Path>, slug: &str) -> Result<MarketFills> {
    let fills = load_fills(path)?;
    Ok(MarketFills::new(slug, fills))
}

/// List `(slug, path)` of every raw fills file in a directory, by slug.
pub fn discover_fill_files(raw_dir: impl AsRef<Path>) -> Result<Vec<(String, PathBuf)>> {
    let raw_dir = raw_dir.as_ref();
    let entries = fs::read_dir(raw_dir).map_err(|e| Error::load(raw_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::load(raw_dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(slug) = slug_from_file_name(name) {
            if entry.path().is_file() {
                files.push((slug.to_string(), entry.path()));
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Load every market in a raw directory.
///
/// Fails if the directory holds no fills files at all.
pub fn load_raw_dir(raw_dir: impl AsRef<Path>) -> Result<Vec<MarketFills>> {
    let raw_dir = raw_dir.as_ref();
    let files = discover_fill_files(raw_dir)?;
    if files.is_empty() {
        return Err(Error::empty_dataset(format!(
            "no fills files found in {}",
            raw_dir.display()
        )));
    }

    files
        .into_iter()
        .map(|(slug, path)| {
            let market = load_market_fills(&path, &slug)?;
            info!(market = %slug, fills = market.fills.len(), "loaded fills");
            Ok(market)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FILL_JSON: &str = r#"[
        {"id": "f1", "timestamp": "1700000000", "maker": "0xA", "taker": "0xB",
         "makerAssetId": "0", "takerAssetId": "tok1", "fee": "0"}
    ]"#;

    #[test]
    fn test_slug_from_file_name() {
        assert_eq!(slug_from_file_name("fills_btc-up.json"), Some("btc-up"));
        assert_eq!(slug_from_file_name("fills_.json"), None);
        assert_eq!(slug_from_file_name("trades_btc.json"), None);
        assert_eq!(slug_from_file_name("fills_btc.csv"), None);
        assert_eq!(file_name_for_slug("btc-up"), "fills_btc-up.json");
    }

    #[test]
    fn test_load_fills() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fills_m.json");
        fs::write(&path, FILL_JSON).unwrap();

        let fills = load_fills(&path).unwrap();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].timestamp, 1_700_000_000);
        assert_eq!(fills[0].taker_asset_id, "tok1");
    }

    #[test]
    fn test_load_invalid_json_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fills_m.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_fills(&path).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
        assert!(err.to_string().contains("fills_m.json"));
    }

    #[test]
    fn test_discover_sorted_by_slug() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fills_zeta.json"), "[]").unwrap();
        fs::write(dir.path().join("fills_alpha.json"), "[]").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = discover_fill_files(dir.path()).unwrap();
        let slugs: Vec<&str> = files.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_load_raw_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fills_m.json"), FILL_JSON).unwrap();

        let markets = load_raw_dir(dir.path()).unwrap();
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].slug, "m");
        assert_eq!(markets[0].fills.len(), 1);
    }

    #[test]
    fn test_empty_raw_dir_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(load_raw_dir(dir.path()), Err(Error::EmptyDataset(_))));
    }
}
