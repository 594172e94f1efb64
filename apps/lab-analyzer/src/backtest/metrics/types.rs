//! Computed metrics for one backtest.

use serde::{Deserialize, Serialize};

/// Flat record of performance metrics for one backtest.
///
/// Derived from a [`BacktestSummary`](crate::backtest::BacktestSummary) on
/// demand and never persisted by the engine. `profit_factor` and
/// `payoff_ratio` may be `f64::INFINITY` when there are no losses; note that
/// `serde_json` writes non-finite floats as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    // Trade counts
    /// Number of trades.
    pub total_trades: u64,
    /// Winning trades / total trades (break-even trades count as neither).
    pub win_rate: f64,

    // P&L, after fees
    /// Sum of positive net P&L.
    pub gross_profit: f64,
    /// Sum of negative net P&L (positive value).
    pub gross_loss: f64,
    /// Sum of P&L minus fees.
    pub net_profit: f64,
    /// Net profit as a percentage of the starting balance.
    pub roe_pct: f64,
    /// Gross profit / gross loss.
    pub profit_factor: f64,
    /// Expected net P&L per trade.
    pub expectancy: f64,
    /// Mean winning net P&L.
    pub avg_win: f64,
    /// Mean losing net P&L (positive value).
    pub avg_loss: f64,
    /// Average win / average loss.
    pub payoff_ratio: f64,

    // Risk
    /// Sample standard deviation of per-trade net P&L.
    pub volatility: f64,
    /// Deviation of losing trades from zero.
    pub downside_deviation: f64,
    /// Mean net P&L / volatility.
    pub sharpe_ratio: f64,
    /// Mean net P&L / downside deviation.
    pub sortino_ratio: f64,
    /// Largest balance drawdown.
    pub max_drawdown: f64,
    /// Largest balance drawdown, percent of peak.
    pub max_drawdown_pct: f64,

    // Time in market
    /// Sum of trade durations in seconds.
    pub exposure_seconds: i64,
    /// Mean trade duration in seconds.
    pub avg_trade_duration_seconds: f64,

    // Streaks
    /// Longest run of winning trades.
    pub max_consecutive_wins: u64,
    /// Longest run of losing trades.
    pub max_consecutive_losses: u64,
}
