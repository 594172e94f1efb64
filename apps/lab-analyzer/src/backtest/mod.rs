//! Backtest analysis pipeline.
//!
//! Turns cached lab backtest results into ranked, comparable numbers:
//!
//! - **Extraction**: raw vendor JSON → [`BacktestSummary`] (or no data)
//! - **Metrics**: [`BacktestSummary`] → [`RunMetrics`]
//! - **Scoring**: [`RunMetrics`] + [`ScoreWeights`] → composite score
//! - **Cache / batch / report**: load cached files, analyze in bulk, rank
//!
//! # Example
//!
//! ```
//! use lab_analyzer::backtest::{ScoreWeights, compute_metrics, composite_score, extract_summary};
//! use serde_json::json;
//!
//! let raw = json!({
//!     "starting_balance": 1000.0,
//!     "trades": [
//!         {"profit_loss": 100.0, "exit_time": 1},
//!         {"profit_loss": -50.0, "exit_time": 2},
//!     ],
//! });
//!
//! let summary = extract_summary(&raw).expect("record has trades");
//! let metrics = compute_metrics(&summary);
//! assert_eq!(metrics.profit_factor, 2.0);
//!
//! let score = composite_score(&metrics, &ScoreWeights::default());
//! assert!(score.is_finite());
//! ```

mod batch;
mod cache;
mod extraction;
mod metrics;
mod report;
mod scoring;
mod types;

pub use batch::{BacktestAnalysis, BatchAnalysis, analyze_records};
pub use cache::{BacktestCache, CACHE_EXTENSION, CacheError, CachedRecord, LoadReport};
pub use extraction::{
    CoercionError, DEFAULT_STARTING_BALANCE, DrawdownStats, Extractor, FieldPath,
    TradeListSource, extract_summary, summarize_trades, track_drawdown,
};
pub use metrics::{
    RunMetrics, compute_metrics, format_decimal, format_duration, format_pct, format_rate,
    format_ratio,
};
pub use report::{
    OutputFormat, ParseFormatError, RankedBacktest, RankingOptions, format_timestamp, rank,
    ranking_csv, ranking_table, render_detail, render_ranking, trades_csv,
};
pub use scoring::{
    MIN_PROFIT_FACTOR_PENALTY, MIN_TRADES_PENALTY, PROFIT_FACTOR_CAP, ScoreBreakdown,
    ScoreWeights, composite_score,
};
pub use types::{BacktestSummary, TradeRecord, TradeSide};
