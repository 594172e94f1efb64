//! Normalized trade and backtest types.

use serde::{Deserialize, Serialize};

/// Position side of a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    /// Long position.
    Long,
    /// Short position.
    Short,
    /// Side missing or not recognised.
    #[default]
    Unknown,
}

impl TradeSide {
    /// Parse a vendor side label. Unrecognised labels map to `Unknown`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Self::Long,
            "short" | "sell" => Self::Short,
            _ => Self::Unknown,
        }
    }

    /// Short label used in reports and CSV output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One closed trade from a backtest run.
///
/// `exit_time >= entry_time` is expected but upstream data does not
/// guarantee it, so it is not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Trade identifier (empty when the vendor omits it).
    pub trade_id: String,
    /// Entry time, epoch seconds.
    pub entry_time: i64,
    /// Exit time, epoch seconds.
    pub exit_time: i64,
    /// Entry price.
    pub entry_price: f64,
    /// Exit price.
    pub exit_price: f64,
    /// Quantity traded.
    pub quantity: f64,
    /// Signed P&L in quote currency, before fees.
    pub profit_loss: f64,
    /// Fees paid.
    pub fees: f64,
    /// Holding time in seconds.
    pub duration_seconds: i64,
    /// Position side.
    pub side: TradeSide,
    /// Market identifier.
    pub market: String,
}

impl TradeRecord {
    /// P&L after fees.
    #[must_use]
    pub fn net_pnl(&self) -> f64 {
        self.profit_loss - self.fees
    }

    /// Check if the trade made money before fees.
    #[must_use]
    pub fn is_winner(&self) -> bool {
        self.profit_loss > 0.0
    }

    /// Check if the trade lost money before fees.
    #[must_use]
    pub fn is_loser(&self) -> bool {
        self.profit_loss < 0.0
    }
}

/// Aggregated view of one backtest run.
///
/// Built once by the extractor from a trade list and a starting balance.
/// Break-even trades count towards `total_trades` but are neither winners
/// nor losers, so `winning_trades + losing_trades` can be less than
/// `total_trades` and `win_rate` is `winning_trades / total_trades`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Backtest identifier.
    pub backtest_id: String,
    /// Owning lab identifier.
    pub lab_id: String,
    /// Number of trades.
    pub total_trades: u64,
    /// Trades with positive P&L.
    pub winning_trades: u64,
    /// Trades with negative P&L.
    pub losing_trades: u64,
    /// `winning_trades / total_trades`.
    pub win_rate: f64,
    /// Sum of positive P&L.
    pub gross_profit: f64,
    /// Sum of negative P&L (positive value).
    pub gross_loss: f64,
    /// Sum of P&L minus sum of fees.
    pub net_profit: f64,
    /// Largest peak-to-trough balance decline.
    pub max_drawdown: f64,
    /// `max_drawdown` as a percentage of the peak it was measured from.
    pub max_drawdown_pct: f64,
    /// Balance before the first trade.
    pub starting_balance: f64,
    /// Balance after the last trade.
    pub final_balance: f64,
    /// Highest balance reached, including the starting balance.
    pub peak_balance: f64,
    /// Trades ordered by exit time ascending.
    pub trades: Vec<TradeRecord>,
    /// Vendor timestamp of the run, epoch seconds.
    pub timestamp: Option<i64>,
}
