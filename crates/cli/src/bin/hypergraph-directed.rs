//! Convert a raw fills file into a directed hypergraph dataset.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use hypergraph_cli::{init_logging, load_config};
use hypergraph_core::{Config, DirectedMode};
use hypergraph_pipeline::run_directed;
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// One edge per fill, maker to taker
    Transaction,
    /// Sellers to buyers per time window
    Timewindow,
}

impl From<Mode> for DirectedMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Transaction => DirectedMode::Transaction,
            Mode::Timewindow => DirectedMode::TimeWindow,
        }
    }
}

#[derive(Parser)]
#[command(name = "hypergraph-directed")]
#[command(about = "Convert Polymarket fills to a directed hypergraph dataset", long_about = None)]
struct Args {
    /// JSON array of fills
    input_file: PathBuf,
    /// Output directory
    output_dir: PathBuf,
    /// Path to a JSON configuration file
    #[arg(long, env = "HYPERGRAPH_CONFIG")]
    config: Option<PathBuf>,
    /// Edge construction [default: directed.mode from config, else transaction]
    #[arg(long, value_enum)]
    mode: Option<Mode>,
    /// Window length in seconds [default: directed.window_seconds, else 3600]
    #[arg(long)]
    window: Option<i64>,
}

impl Args {
    /// Mode and window, flags taking precedence over the config file.
    fn settings(&self, config: &Config) -> (DirectedMode, i64) {
        (
            self.mode.map_or(config.directed.mode, DirectedMode::from),
            self.window.unwrap_or(config.directed.window_seconds),
        )
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = load_config(args.config.as_deref())?;
    let (mode, window) = args.settings(&config);

    let stats = run_directed(&args.input_file, &args.output_dir, mode, window)
        .with_context(|| format!("Failed to convert {}", args.input_file.display()))?;

    info!(
        nodes = stats.nodes,
        hyperedges = stats.hyperedges,
        left_min = stats.left_size.min,
        left_max = stats.left_size.max,
        left_mean = stats.left_size.mean,
        right_min = stats.right_size.min,
        right_max = stats.right_size.max,
        right_mean = stats.right_size.mean,
        "directed hypergraph written to {}",
        args.output_dir.display()
    );
    Ok(())
}
