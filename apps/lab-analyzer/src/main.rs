//! Lab Analyzer Binary
//!
//! Ranks and inspects cached lab backtest results.
//!
//! # Usage
//!
//! ```bash
//! lab-analyzer rank --lab lab-7 --top 5 --format csv
//! lab-analyzer show bt-42
//! lab-analyzer show bt-42 --json
//! lab-analyzer trades bt-42 > bt-42-trades.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: `logging.level` from the config, else info)
//!
//! Reports are written to stdout, logs to stderr.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lab_analyzer::backtest::{
    BacktestAnalysis, BacktestCache, Extractor, OutputFormat, analyze_records, rank,
    render_detail, render_ranking, trades_csv,
};
use lab_analyzer::config::{Config, load_config};
use lab_analyzer::telemetry::init_telemetry;

#[derive(Parser)]
#[command(
    name = "lab-analyzer",
    version,
    about = "Rank and inspect cached trading lab backtests"
)]
struct Cli {
    /// Path to the YAML config file (default: lab-analyzer.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the cache directory from the config
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank cached backtests by composite score
    Rank {
        /// Only rank backtests of this lab
        #[arg(long)]
        lab: Option<String>,

        /// Number of backtests to show
        #[arg(short, long)]
        top: Option<usize>,

        /// Hide backtests below this profit factor
        #[arg(long)]
        min_profit_factor: Option<f64>,

        /// Hide backtests with fewer trades
        #[arg(long)]
        min_trades: Option<u64>,

        /// Output format: table, csv or json
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
    /// Show summary, metrics and score breakdown of one backtest
    Show {
        /// Backtest identifier
        backtest_id: String,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the trade list of one backtest as CSV
    Trades {
        /// Backtest identifier
        backtest_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = cli.cache_dir.clone() {
        config.cache.dir = dir;
    }

    init_telemetry(&config.logging)
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize tracing")?;

    let cache = BacktestCache::new(config.cache.dir.clone());
    let extractor = Extractor::new(config.extraction.default_starting_balance);

    let output = match cli.command {
        Command::Rank {
            lab,
            top,
            min_profit_factor,
            min_trades,
            format,
        } => {
            let mut options = config.report.ranking_options();
            if let Some(top) = top {
                options.top_n = Some(top);
            }
            options.min_profit_factor = min_profit_factor.or(options.min_profit_factor);
            options.min_trades = min_trades.or(options.min_trades);
            let format = format.unwrap_or(config.report.format);

            run_rank(&config, &cache, &extractor, lab.as_deref(), &options, format)?
        }
        Command::Show { backtest_id, json } => {
            let analysis = analyze_one(&config, &cache, &extractor, &backtest_id)?;
            if json {
                let mut out = serde_json::to_string_pretty(&analysis)
                    .context("failed to serialize analysis")?;
                out.push('\n');
                out
            } else {
                render_detail(&analysis)
            }
        }
        Command::Trades { backtest_id } => {
            let analysis = analyze_one(&config, &cache, &extractor, &backtest_id)?;
            trades_csv(&analysis.summary)
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("failed to write report")?;
    stdout.flush().context("failed to flush report")?;
    Ok(())
}

fn run_rank(
    config: &Config,
    cache: &BacktestCache,
    extractor: &Extractor,
    lab: Option<&str>,
    options: &lab_analyzer::backtest::RankingOptions,
    format: OutputFormat,
) -> Result<String> {
    let report = match lab {
        Some(lab) => cache.load_lab(lab),
        None => cache.load_all(),
    }
    .with_context(|| format!("failed to read cache at {}", cache.root().display()))?;

    if report.files_failed > 0 {
        tracing::warn!(
            failed = report.files_failed,
            scanned = report.files_scanned,
            "Some cache files could not be read"
        );
    }

    let batch = analyze_records(&report.records, extractor, &config.scoring);
    let ranked = rank(&batch.analyses, options);

    tracing::info!(
        analyzed = batch.analyses.len(),
        skipped = batch.skipped,
        shown = ranked.len(),
        "Ranking complete"
    );

    render_ranking(&ranked, format).context("failed to render ranking")
}

fn analyze_one(
    config: &Config,
    cache: &BacktestCache,
    extractor: &Extractor,
    backtest_id: &str,
) -> Result<BacktestAnalysis> {
    let record = cache
        .find(backtest_id)
        .with_context(|| format!("backtest {backtest_id} not found in cache"))?;

    BacktestAnalysis::from_cached(&record, extractor, &config.scoring)
        .with_context(|| format!("backtest {backtest_id} has no usable trade data"))
}
