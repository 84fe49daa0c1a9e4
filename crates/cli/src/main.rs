use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hypergraph_cli::{init_logging, load_config};
use hypergraph_pipeline::{generate_all, process_market, run_batch};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "hypergraph")]
#[command(about = "Build temporal hypergraph datasets from Polymarket fills", long_about = None)]
struct Cli {
    /// JSON config file (defaults apply to anything it omits)
    #[arg(short, long, global = true, env = "HYPERGRAPH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the unified dataset and every per-market dataset
    Generate {
        /// Directory holding fills_<slug>.json files
        #[arg(long)]
        raw_dir: Option<PathBuf>,
        /// Output directory of the unified dataset
        #[arg(long)]
        unified_dir: Option<PathBuf>,
        /// Parent directory of per-market datasets
        #[arg(long)]
        by_market_dir: Option<PathBuf>,
    },
    /// Build one market's dataset from its raw fills, then refresh the unified dataset
    Market {
        /// Market slug or polymarket.com URL
        market: String,
    },
    /// Build datasets for many markets and print a JSON report
    Batch {
        /// Market slugs or polymarket.com URLs
        #[arg(required = true)]
        markets: Vec<String>,
        /// Parallel workers (0 = one per core)
        #[arg(long)]
        workers: Option<u32>,
        /// Stop starting new markets after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
        /// Skip regenerating the unified dataset afterwards
        #[arg(long)]
        no_unified: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            raw_dir,
            unified_dir,
            by_market_dir,
        } => {
            if let Some(dir) = raw_dir {
                config.paths.raw_dir = dir;
            }
            if let Some(dir) = unified_dir {
                config.paths.unified_dir = dir;
            }
            if let Some(dir) = by_market_dir {
                config.paths.by_market_dir = dir;
            }

            let report = generate_all(&config).context("Hypergraph generation failed")?;
            info!(
                unified = %config.paths.unified_dir.display(),
                by_market = %config.paths.by_market_dir.display(),
                succeeded = report.succeeded,
                failed = report.failed,
                unified_ok = report.unified.is_completed(),
                "hypergraph generation complete"
            );
            print_json(&report)?;
        }
        Commands::Market { market } => {
            let report = process_market(&config, &market)
                .with_context(|| format!("Failed to process market {market}"))?;
            print_json(&report)?;
        }
        Commands::Batch {
            markets,
            workers,
            deadline_secs,
            no_unified,
        } => {
            if let Some(workers) = workers {
                config.batch.workers = workers;
            }
            if deadline_secs.is_some() {
                config.batch.deadline_secs = deadline_secs;
            }
            if no_unified {
                config.batch.refresh_unified = false;
            }

            let report = run_batch(&config, &markets).context("Batch failed to start")?;
            print_json(&report)?;
        }
    }

    Ok(())
}
