// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::cast_precision_loss
    )
)]

//! Lab Analyzer - Backtest Evaluation Library
//!
//! Evaluates cached trading-lab backtest results and ranks them.
//!
//! # Pipeline
//!
//! - **Extraction**: heterogeneous vendor JSON → normalized `BacktestSummary`
//! - **Metrics**: profit factor, expectancy, volatility, drawdown and more
//! - **Scoring**: weighted composite score with soft quality gates
//! - **Cache**: JSON files on disk, grouped by lab
//! - **Report**: ranked table, CSV or JSON output
//!
//! # Modules
//!
//! - `backtest`: the analysis pipeline
//! - `config`: YAML configuration with `${VAR}` interpolation
//! - `telemetry`: tracing subscriber setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Backtest extraction, metrics, scoring, caching and ranking.
pub mod backtest;

/// Configuration loading and validation.
pub mod config;

/// Tracing subscriber setup.
pub mod telemetry;

pub use backtest::{
    BacktestAnalysis, BacktestCache, BacktestSummary, Extractor, RunMetrics, ScoreWeights,
    TradeRecord, analyze_records, composite_score, compute_metrics, extract_summary, rank,
};
pub use config::{Config, ConfigError, load_config};
