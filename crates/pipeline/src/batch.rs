//! Batch processing of many markets.
//!
//! Markets are isolated: a failing market is reported and the rest of the
//! batch continues. Each market writes only its own output directory, so
//! markets may run on parallel workers.

use crate::orchestrator::{run_unified, MarketOutcome, StageResult};
use crate::slug::parse_market_slug;
use hypergraph_core::{validate_market_slug, Config, Error, Result};
use hypergraph_export::CongressStats;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result of a whole batch, entries in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<MarketOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    /// Unified refresh, if one was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unified: Option<StageResult<CongressStats>>,
}

/// A batch entry after slug parsing and duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Planned {
    Run(String),
    Rejected { slug: String, reason: String },
}

fn plan(inputs: &[String]) -> Vec<Planned> {
    let mut seen = BTreeSet::new();
    inputs
        .iter()
        .map(|input| {
            let slug = parse_market_slug(input);
            if let Err(e) = validate_market_slug(&slug) {
                Planned::Rejected {
                    slug,
                    reason: format!("invalid market in {input:?}: {e}"),
                }
            } else if !seen.insert(slug.clone()) {
                Planned::Rejected {
                    reason: format!("duplicate market {slug} in batch"),
                    slug,
                }
            } else {
                Planned::Run(slug)
            }
        })
        .collect()
}

/// Process every market given as a slug or URL.
///
/// Uses `config.batch` for worker count, deadline and unified refresh. The
/// deadline only prevents markets from starting; a started market always
/// finishes. Fails only if the worker pool cannot be created.
pub fn run_batch(config: &Config, inputs: &[String]) -> Result<BatchReport> {
    let started = Instant::now();
    let deadline = config
        .batch
        .deadline_secs
        .map(|secs| started + Duration::from_secs(secs));

    let planned = plan(inputs);
    let workers = config.batch.workers as usize;
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| Error::config(format!("cannot start {workers} batch workers: {e}")))?;

    info!(
        markets = planned.len(),
        workers = pool.current_num_threads(),
        "starting batch"
    );

    let outcomes: Vec<MarketOutcome> = pool.install(|| {
        planned
            .par_iter()
            .map(|entry| match entry {
                Planned::Rejected { slug, reason } => MarketOutcome::failed(slug, reason),
                Planned::Run(slug) => {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        return MarketOutcome::failed(slug, "skipped: batch deadline reached");
                    }
                    MarketOutcome::run(config, slug)
                }
            })
            .collect()
    });

    for outcome in outcomes.iter().filter(|o| !o.success) {
        warn!(
            market = %outcome.slug,
            error = outcome.error.as_deref().unwrap_or_default(),
            "market failed"
        );
    }

    let succeeded = outcomes.iter().filter(|o| o.success).count();
    let failed = outcomes.len() - succeeded;

    let unified = if config.batch.refresh_unified && succeeded > 0 {
        Some(StageResult::capture("unified", "batch", run_unified(config)))
    } else {
        None
    };

    info!(
        succeeded,
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch complete"
    );

    Ok(BatchReport {
        outcomes,
        succeeded,
        failed,
        unified,
    })
}
