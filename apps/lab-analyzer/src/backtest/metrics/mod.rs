//! Performance metrics calculation for backtest evaluation.
//!
//! Implements the per-backtest metrics used for ranking:
//! - Profit factor (gross profit / gross loss)
//! - Win rate, expectancy, average win/loss and payoff ratio
//! - Volatility and downside deviation of per-trade net P&L
//! - Sharpe/Sortino proxies (mean trade P&L over volatility)
//! - Exposure and average trade duration

mod calculator;
mod format;
mod math;
mod types;

pub use calculator::compute_metrics;
pub use format::{format_decimal, format_duration, format_pct, format_rate, format_ratio};
pub use types::RunMetrics;
