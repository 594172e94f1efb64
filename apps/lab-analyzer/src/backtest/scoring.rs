//! Composite scoring of backtest metrics.
//!
//! Collapses [`RunMetrics`] into one comparable number:
//!
//! ```text
//! base = roi_weight * net_profit
//!      - drawdown_weight * max_drawdown
//!      - volatility_weight * volatility
//!      + profit_factor_weight * min(profit_factor, 3.0)
//!      + win_rate_weight * win_rate
//! ```
//!
//! Two gates then scale the base score multiplicatively. They penalise,
//! they do not exclude:
//!
//! - fewer than `min_trades` trades: × 0.5
//! - finite profit factor below `min_profit_factor`: × 0.7

use serde::{Deserialize, Serialize};

use super::metrics::RunMetrics;

/// Profit factor ceiling used in the score; also stands in for an infinite
/// profit factor.
pub const PROFIT_FACTOR_CAP: f64 = 3.0;

/// Multiplier applied when the trade count is below `min_trades`.
pub const MIN_TRADES_PENALTY: f64 = 0.5;

/// Multiplier applied when the profit factor is below `min_profit_factor`.
pub const MIN_PROFIT_FACTOR_PENALTY: f64 = 0.7;

/// Score weights and gate thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight on net profit.
    #[serde(default = "default_roi_weight")]
    pub roi_weight: f64,
    /// Weight on max drawdown (subtracted).
    #[serde(default = "default_drawdown_weight")]
    pub drawdown_weight: f64,
    /// Weight on volatility (subtracted).
    #[serde(default = "default_volatility_weight")]
    pub volatility_weight: f64,
    /// Weight on capped profit factor.
    #[serde(default = "default_profit_factor_weight")]
    pub profit_factor_weight: f64,
    /// Weight on win rate. Zero by default.
    #[serde(default)]
    pub win_rate_weight: f64,
    /// Trade count below which the score is halved.
    #[serde(default = "default_min_trades")]
    pub min_trades: u64,
    /// Profit factor below which the score is scaled by 0.7.
    #[serde(default = "default_min_profit_factor")]
    pub min_profit_factor: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            roi_weight: default_roi_weight(),
            drawdown_weight: default_drawdown_weight(),
            volatility_weight: default_volatility_weight(),
            profit_factor_weight: default_profit_factor_weight(),
            win_rate_weight: 0.0,
            min_trades: default_min_trades(),
            min_profit_factor: default_min_profit_factor(),
        }
    }
}

const fn default_roi_weight() -> f64 {
    1.0
}
const fn default_drawdown_weight() -> f64 {
    0.5
}
const fn default_volatility_weight() -> f64 {
    0.1
}
const fn default_profit_factor_weight() -> f64 {
    10.0
}
const fn default_min_trades() -> u64 {
    10
}
const fn default_min_profit_factor() -> f64 {
    1.1
}

/// Score with its components, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Weighted sum before gates.
    pub base: f64,
    /// Minimum trade gate triggered.
    pub min_trades_penalty: bool,
    /// Minimum profit factor gate triggered.
    pub profit_factor_penalty: bool,
    /// Final score.
    pub score: f64,
}

impl ScoreBreakdown {
    /// Evaluate the score for `metrics`.
    #[must_use]
    pub fn evaluate(metrics: &RunMetrics, weights: &ScoreWeights) -> Self {
        // NaN profit factor contributes nothing and is penalised.
        let pf = metrics.profit_factor;
        let capped_pf = if pf.is_nan() { 0.0 } else { pf.min(PROFIT_FACTOR_CAP) };

        let base = weights.roi_weight * metrics.net_profit
            - weights.drawdown_weight * metrics.max_drawdown
            - weights.volatility_weight * metrics.volatility
            + weights.profit_factor_weight * capped_pf
            + weights.win_rate_weight * metrics.win_rate;

        let min_trades_penalty = metrics.total_trades < weights.min_trades;
        let profit_factor_penalty = pf.is_nan() || (pf.is_finite() && pf < weights.min_profit_factor);

        let mut score = base;
        if min_trades_penalty {
            score *= MIN_TRADES_PENALTY;
        }
        if profit_factor_penalty {
            score *= MIN_PROFIT_FACTOR_PENALTY;
        }

        Self {
            base,
            min_trades_penalty,
            profit_factor_penalty,
            score,
        }
    }
}

/// Composite score for `metrics` under `weights`.
#[must_use]
pub fn composite_score(metrics: &RunMetrics, weights: &ScoreWeights) -> f64 {
    ScoreBreakdown::evaluate(metrics, weights).score
}
