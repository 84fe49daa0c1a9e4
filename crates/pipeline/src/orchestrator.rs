//! Dataset generation runs.
//!
//! Each run is a full recomputation from the raw fills files: load, aggregate,
//! assign ids, write. Nothing is cached between runs.

use crate::slug::parse_market_slug;
use chrono::{DateTime, Utc};
use hypergraph_core::{
    normalize_address, ts_to_datetime, validate_market_slug, Config, DirectedMode, Error, Fill,
    MarketFills, Result, TimestampSecs,
};
use hypergraph_export::{
    write_congress_dataset, write_directed_dataset, CongressStats, DirectedStats,
};
use hypergraph_ingestion::{
    build_directed_hyperedges, build_market_hyperedges, build_unified_hyperedges,
    discover_fill_files, load_fills, load_market_fills, load_raw_dir, HyperedgeSet,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Overview of a market's raw fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillSummary {
    pub total_fills: usize,
    /// Distinct normalized maker and taker addresses.
    pub unique_traders: usize,
    pub first_timestamp: TimestampSecs,
    pub last_timestamp: TimestampSecs,
    pub first_time: Option<DateTime<Utc>>,
    pub last_time: Option<DateTime<Utc>>,
}

impl FillSummary {
    /// Summarize a list of fills. `None` when the list is empty.
    pub fn from_fills(fills: &[Fill]) -> Option<Self> {
        let first_timestamp = fills.iter().map(|f| f.timestamp).min()?;
        let last_timestamp = fills.iter().map(|f| f.timestamp).max()?;

        let traders: BTreeSet<String> = fills
            .iter()
            .flat_map(|f| [f.maker.as_str(), f.taker.as_str()])
            .map(normalize_address)
            .filter(|a| !a.is_empty())
            .collect();

        Some(Self {
            total_fills: fills.len(),
            unique_traders: traders.len(),
            first_timestamp,
            last_timestamp,
            first_time: ts_to_datetime(first_timestamp),
            last_time: ts_to_datetime(last_timestamp),
        })
    }
}

/// Outcome of a step whose failure must not fail the surrounding run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StageResult<T> {
    Completed { stats: T },
    Failed { error: String },
}

impl<T> StageResult<T> {
    /// Record a step result, logging a failure.
    pub fn capture(stage: &str, market: &str, result: Result<T>) -> Self {
        match result {
            Ok(stats) => StageResult::Completed { stats },
            Err(e) => {
                warn!(market, stage, error = %e, "stage failed");
                StageResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StageResult::Completed { .. })
    }

    pub fn stats(&self) -> Option<&T> {
        match self {
            StageResult::Completed { stats } => Some(stats),
            StageResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            StageResult::Completed { .. } => None,
            StageResult::Failed { error } => Some(error),
        }
    }
}

/// Raw fills of one market, checked to be present and non-empty.
#[derive(Debug, Clone)]
pub(crate) struct RawMarket {
    pub path: PathBuf,
    pub fills: MarketFills,
    pub summary: FillSummary,
}

/// Load a market's raw fills file written by the fetch step.
pub(crate) fn load_raw_market(config: &Config, slug: &str) -> Result<RawMarket> {
    validate_market_slug(slug)?;
    let path = config.paths.fills_file(slug);
    if !path.is_file() {
        return Err(Error::upstream_fetch(
            slug,
            format!("no raw fills file at {}", path.display()),
        ));
    }

    let fills = load_market_fills(&path, slug)?;
    let summary = FillSummary::from_fills(&fills.fills)
        .ok_or_else(|| Error::empty_dataset(format!("no fills found for market {slug}")))?;
    Ok(RawMarket {
        path,
        fills,
        summary,
    })
}

pub(crate) fn market_dataset(config: &Config, market: &MarketFills) -> Result<CongressStats> {
    let set = build_market_hyperedges(market)?;
    log_hyperedge_set(&market.slug, &set);
    write_congress_dataset(
        &set.edges,
        config.paths.market_dir(&market.slug),
        &market.slug,
    )
}

fn unified_dataset(config: &Config, markets: &[MarketFills]) -> Result<CongressStats> {
    let set = build_unified_hyperedges(markets)?;
    log_hyperedge_set("unified", &set);
    write_congress_dataset(
        &set.edges,
        &config.paths.unified_dir,
        &config.output.unified_prefix,
    )
}

fn log_hyperedge_set(scope: &str, set: &HyperedgeSet) {
    debug!(
        scope,
        markets = set.markets.len(),
        fills = set.fill_count,
        hyperedges = set.edges.len(),
        occurrences = set.total_vertex_occurrences(),
        "aggregated hyperedges"
    );
}

/// Per-market data of a successfully built market.
#[derive(Debug, Clone, Serialize)]
pub struct MarketDataset {
    pub fills: FillSummary,
    pub hypergraph: CongressStats,
}

/// Result of building one market inside a multi-market run.
#[derive(Debug, Clone, Serialize)]
pub struct MarketOutcome {
    pub slug: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MarketDataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MarketOutcome {
    pub(crate) fn completed(slug: &str, data: MarketDataset) -> Self {
        Self {
            slug: slug.to_string(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub(crate) fn failed(slug: &str, error: impl ToString) -> Self {
        Self {
            slug: slug.to_string(),
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    /// Build one market, turning any error into a failed outcome.
    pub(crate) fn run(config: &Config, slug: &str) -> Self {
        let result = load_raw_market(config, slug).and_then(|raw| {
            let hypergraph = market_dataset(config, &raw.fills)?;
            Ok(MarketDataset {
                fills: raw.summary,
                hypergraph,
            })
        });
        match result {
            Ok(data) => Self::completed(slug, data),
            Err(e) => Self::failed(slug, e),
        }
    }
}

/// Build one market's undirected dataset from its raw fills file.
pub fn run_market(config: &Config, slug: &str) -> Result<CongressStats> {
    let raw = load_raw_market(config, slug)?;
    market_dataset(config, &raw.fills)
}

/// Build the unified dataset from every raw fills file.
pub fn run_unified(config: &Config) -> Result<CongressStats> {
    let markets = load_raw_dir(&config.paths.raw_dir)?;
    unified_dataset(config, &markets)
}

/// Result of regenerating every dataset.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub unified: StageResult<CongressStats>,
    /// One entry per raw fills file, ordered by slug.
    pub markets: Vec<MarketOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Regenerate the unified dataset, then every per-market dataset.
///
/// Failures are recorded per step; a bad market never prevents the others
/// from being written. Fails only when the raw directory holds no fills files.
pub fn generate_all(config: &Config) -> Result<GenerateReport> {
    let raw_dir = &config.paths.raw_dir;
    let files = discover_fill_files(raw_dir)?;
    if files.is_empty() {
        return Err(Error::empty_dataset(format!(
            "no fills files found in {}",
            raw_dir.display()
        )));
    }

    info!(markets = files.len(), "building unified hypergraph");
    let unified = StageResult::capture("unified", "all", run_unified(config));

    info!("building per-market hypergraphs");
    let markets: Vec<MarketOutcome> = files
        .iter()
        .map(|(slug, _)| {
            let outcome = MarketOutcome::run(config, slug);
            if let Some(error) = &outcome.error {
                warn!(market = %slug, %error, "market failed");
            }
            outcome
        })
        .collect();

    let succeeded = markets.iter().filter(|o| o.success).count();
    let failed = markets.len() - succeeded;
    Ok(GenerateReport {
        unified,
        markets,
        succeeded,
        failed,
    })
}

/// Result of processing one freshly fetched market.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub market_slug: String,
    pub raw_fills_path: PathBuf,
    pub fills: FillSummary,
    pub hypergraph: StageResult<CongressStats>,
    pub unified_hypergraph: StageResult<CongressStats>,
}

/// Process one market given as a slug or URL.
///
/// Requires the market's raw fills file. A failure while building either
/// dataset is recorded in the report instead of failing the call.
pub fn process_market(config: &Config, input: &str) -> Result<ProcessReport> {
    let slug = parse_market_slug(input);
    let raw = load_raw_market(config, &slug)?;
    info!(
        market = %slug,
        fills = raw.summary.total_fills,
        traders = raw.summary.unique_traders,
        first = raw.summary.first_timestamp,
        last = raw.summary.last_timestamp,
        "loaded market fills"
    );

    let hypergraph = StageResult::capture("market", &slug, market_dataset(config, &raw.fills));
    let unified_hypergraph = StageResult::capture("unified", &slug, run_unified(config));

    Ok(ProcessReport {
        market_slug: slug,
        raw_fills_path: raw.path,
        fills: raw.summary,
        hypergraph,
        unified_hypergraph,
    })
}

/// Convert a raw fills file into a directed dataset.
pub fn run_directed(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    mode: DirectedMode,
    window_secs: i64,
) -> Result<DirectedStats> {
    let input = input.as_ref();
    let fills = load_fills(input)?;
    info!(file = %input.display(), fills = fills.len(), %mode, "converting fills");

    let edges = build_directed_hyperedges(&fills, mode, window_secs)?;
    write_directed_dataset(&edges, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_fill(id: &str, ts: i64, maker: &str, taker: &str) -> Fill {
        Fill {
            id: id.to_string(),
            timestamp: ts,
            maker: maker.to_string(),
            taker: taker.to_string(),
            maker_asset_id: "0".to_string(),
            taker_asset_id: "tok1".to_string(),
        }
    }

    #[test]
    fn test_fill_summary() {
        let fills = vec![
            make_fill("a", 1_700_000_100, "0xA", "0xB"),
            make_fill("b", 1_700_000_000, "0xb", "0xC"),
        ];
        let summary = FillSummary::from_fills(&fills).unwrap();

        assert_eq!(summary.total_fills, 2);
        assert_eq!(summary.unique_traders, 3);
        assert_eq!(summary.first_timestamp, 1_700_000_000);
        assert_eq!(summary.last_timestamp, 1_700_000_100);
        assert_eq!(
            summary.first_time.map(|t| t.to_rfc3339()),
            Some("2023-11-14T22:13:20+00:00".to_string())
        );
        assert!(FillSummary::from_fills(&[]).is_none());
    }

    #[test]
    fn test_stage_result_capture() {
        let ok: StageResult<u32> = StageResult::capture("market", "m", Ok(3));
        assert!(ok.is_completed());
        assert_eq!(ok.stats(), Some(&3));

        let failed: StageResult<u32> =
            StageResult::capture("market", "m", Err(Error::integrity("bad")));
        assert!(!failed.is_completed());
        assert_eq!(failed.error(), Some("Integrity error: bad"));
    }

    #[test]
    fn test_stage_result_json_shape() {
        let failed: StageResult<u32> = StageResult::Failed {
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
    }
}
