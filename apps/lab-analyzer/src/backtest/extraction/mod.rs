//! Raw backtest extraction.
//!
//! Turns a vendor backtest record (arbitrary nested JSON) into a
//! [`BacktestSummary`]. Extraction never fails loudly:
//!
//! - Malformed trades are logged at warn level and skipped.
//! - A record with no usable trades yields `None`.
//! - A record that is not a JSON object yields `None`.
//!
//! Callers treat `None` as "no data" and move on, which keeps batch analysis
//! over large caches running when individual files are bad.

mod coerce;
mod drawdown;
mod lookup;

use serde_json::{Map, Value};
use tracing::{debug, warn};

pub use coerce::{
    CoercionError, coerce_float, coerce_int, float_field, int_field, string_field, value_kind,
};
pub use drawdown::{DrawdownStats, track_drawdown};
pub use lookup::{FieldPath, TradeListSource, first_present, locate_trades};

use super::types::{BacktestSummary, TradeRecord, TradeSide};

/// Starting balance assumed when a record does not carry one.
pub const DEFAULT_STARTING_BALANCE: f64 = 10_000.0;

const STARTING_BALANCE_PATHS: &[FieldPath] = &[
    FieldPath::new(&["starting_balance"]),
    FieldPath::new(&["initial_balance"]),
];
const BACKTEST_ID_PATHS: &[FieldPath] = &[
    FieldPath::new(&["backtest_id"]),
    FieldPath::new(&["id"]),
];
const LAB_ID_PATHS: &[FieldPath] = &[FieldPath::new(&["lab_id"])];
const TIMESTAMP_PATHS: &[FieldPath] = &[FieldPath::new(&["timestamp"])];

/// Configurable extractor.
#[derive(Debug, Clone)]
pub struct Extractor {
    trade_sources: Vec<TradeListSource>,
    default_starting_balance: f64,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            trade_sources: TradeListSource::ALL.to_vec(),
            default_starting_balance: DEFAULT_STARTING_BALANCE,
        }
    }
}

impl Extractor {
    /// Create an extractor with a custom fallback starting balance.
    #[must_use]
    pub fn new(default_starting_balance: f64) -> Self {
        Self {
            default_starting_balance,
            ..Self::default()
        }
    }

    /// Override the trade list probing order.
    #[must_use]
    pub fn with_trade_sources(mut self, sources: Vec<TradeListSource>) -> Self {
        self.trade_sources = sources;
        self
    }

    /// Fallback starting balance.
    #[must_use]
    pub const fn default_starting_balance(&self) -> f64 {
        self.default_starting_balance
    }

    /// Extract a summary from a raw backtest record.
    #[must_use]
    pub fn extract(&self, raw: &Value) -> Option<BacktestSummary> {
        if !raw.is_object() {
            warn!(kind = value_kind(raw), "Backtest record is not an object, skipping");
            return None;
        }

        let backtest_id = first_present(raw, BACKTEST_ID_PATHS)
            .map(scalar_to_string)
            .unwrap_or_default();
        let lab_id = first_present(raw, LAB_ID_PATHS)
            .map(scalar_to_string)
            .unwrap_or_default();

        let Some((source, entries)) = locate_trades(raw, &self.trade_sources) else {
            debug!(backtest_id = %backtest_id, "No trade list found in backtest record");
            return None;
        };
        debug!(
            backtest_id = %backtest_id,
            source = %source.path(),
            entries = entries.len(),
            "Located trade list"
        );

        let trades: Vec<TradeRecord> = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match parse_trade(entry) {
                Ok(trade) => Some(trade),
                Err(e) => {
                    warn!(
                        backtest_id = %backtest_id,
                        index,
                        error = %e,
                        "Skipping malformed trade"
                    );
                    None
                }
            })
            .collect();

        if trades.is_empty() {
            warn!(backtest_id = %backtest_id, "No usable trades in backtest record");
            return None;
        }

        let starting_balance = self.starting_balance(raw, &backtest_id);
        let timestamp = first_present(raw, TIMESTAMP_PATHS).and_then(|value| {
            coerce_int(value, "timestamp")
                .inspect_err(|e| warn!(backtest_id = %backtest_id, error = %e, "Ignoring timestamp"))
                .ok()
        });

        let summary = summarize_trades(backtest_id, lab_id, starting_balance, trades, timestamp);
        if !has_finite_totals(&summary) {
            warn!(
                backtest_id = %summary.backtest_id,
                "Backtest totals overflow, skipping"
            );
            return None;
        }
        Some(summary)
    }

    fn starting_balance(&self, raw: &Value, backtest_id: &str) -> f64 {
        let Some(value) = first_present(raw, STARTING_BALANCE_PATHS) else {
            return self.default_starting_balance;
        };
        coerce_float(value, "starting_balance").unwrap_or_else(|e| {
            warn!(
                backtest_id = %backtest_id,
                error = %e,
                fallback = self.default_starting_balance,
                "Unreadable starting balance, using fallback"
            );
            self.default_starting_balance
        })
    }
}

/// Extract a summary with the default extractor.
///
/// Returns `None` when the record holds no usable trade data.
#[must_use]
pub fn extract_summary(raw: &Value) -> Option<BacktestSummary> {
    Extractor::default().extract(raw)
}

/// Build a summary from already-normalized trades.
///
/// Trades are stably sorted by exit time; the running balance starts at
/// `starting_balance` and moves by each trade's net P&L.
#[must_use]
pub fn summarize_trades(
    backtest_id: impl Into<String>,
    lab_id: impl Into<String>,
    starting_balance: f64,
    mut trades: Vec<TradeRecord>,
    timestamp: Option<i64>,
) -> BacktestSummary {
    trades.sort_by_key(|t| t.exit_time);

    let mut gross_profit = 0.0;
    let mut gross_loss = 0.0;
    let mut winning_trades = 0u64;
    let mut losing_trades = 0u64;
    let mut total_pnl = 0.0;
    let mut total_fees = 0.0;

    for trade in &trades {
        if trade.is_winner() {
            gross_profit += trade.profit_loss;
            winning_trades += 1;
        } else if trade.is_loser() {
            gross_loss += trade.profit_loss.abs();
            losing_trades += 1;
        }
        total_pnl += trade.profit_loss;
        total_fees += trade.fees;
    }

    let total_trades = trades.len() as u64;
    let win_rate = if total_trades > 0 {
        winning_trades as f64 / total_trades as f64
    } else {
        0.0
    };

    let drawdown = track_drawdown(starting_balance, trades.iter().map(TradeRecord::net_pnl));

    BacktestSummary {
        backtest_id: backtest_id.into(),
        lab_id: lab_id.into(),
        total_trades,
        winning_trades,
        losing_trades,
        win_rate,
        gross_profit,
        gross_loss,
        net_profit: total_pnl - total_fees,
        max_drawdown: drawdown.max_drawdown,
        max_drawdown_pct: drawdown.max_drawdown_pct,
        starting_balance,
        final_balance: drawdown.final_balance,
        peak_balance: drawdown.peak_balance,
        trades,
        timestamp,
    }
}

fn parse_trade(entry: &Value) -> Result<TradeRecord, CoercionError> {
    let obj: &Map<String, Value> = entry.as_object().ok_or(CoercionError::UnsupportedType {
        field: "trade",
        kind: value_kind(entry),
    })?;

    Ok(TradeRecord {
        trade_id: string_field(obj, "trade_id"),
        entry_time: int_field(obj, "entry_time")?,
        exit_time: int_field(obj, "exit_time")?,
        entry_price: float_field(obj, "entry_price")?,
        exit_price: float_field(obj, "exit_price")?,
        quantity: float_field(obj, "quantity")?,
        profit_loss: float_field(obj, "profit_loss")?,
        fees: float_field(obj, "fees")?,
        duration_seconds: int_field(obj, "duration_seconds")?,
        side: TradeSide::from_label(&string_field(obj, "side")),
        market: string_field(obj, "market"),
    })
}

/// Sums of finite trade values can still overflow to infinity.
fn has_finite_totals(summary: &BacktestSummary) -> bool {
    [
        summary.gross_profit,
        summary.gross_loss,
        summary.net_profit,
        summary.max_drawdown,
        summary.max_drawdown_pct,
        summary.final_balance,
        summary.peak_balance,
    ]
    .iter()
    .all(|v| v.is_finite())
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw_trade(id: &str, exit_time: i64, profit_loss: f64) -> Value {
        json!({
            "trade_id": id,
            "entry_time": exit_time - 60,
            "exit_time": exit_time,
            "entry_price": 100.0,
            "exit_price": 101.0,
            "quantity": 1.0,
            "profit_loss": profit_loss,
            "fees": 0.0,
            "duration_seconds": 60,
            "side": "long",
            "market": "BINANCE_BTC_USDT_",
        })
    }

    #[test]
    fn test_extract_basic_record() {
        let raw = json!({
            "backtest_id": "bt-1",
            "lab_id": "lab-9",
            "starting_balance": 1000.0,
            "timestamp": 1_700_000_000,
            "trades": [raw_trade("a", 100, 100.0), raw_trade("b", 200, -50.0)],
        });

        let Some(summary) = extract_summary(&raw) else {
            panic!("record with trades should extract");
        };
        assert_eq!(summary.backtest_id, "bt-1");
        assert_eq!(summary.lab_id, "lab-9");
        assert_eq!(summary.total_trades, 2);
        assert_eq!(summary.winning_trades, 1);
        assert_eq!(summary.losing_trades, 1);
        assert_eq!(summary.win_rate, 0.5);
        assert_eq!(summary.gross_profit, 100.0);
        assert_eq!(summary.gross_loss, 50.0);
        assert_eq!(summary.net_profit, 50.0);
        assert_eq!(summary.final_balance, 1050.0);
        assert_eq!(summary.peak_balance, 1100.0);
        assert_eq!(summary.max_drawdown, 50.0);
        assert_eq!(summary.timestamp, Some(1_700_000_000));
        assert_eq!(summary.trades[0].side, TradeSide::Long);
    }

    #[test]
    fn test_extract_defaults_starting_balance() {
        let raw = json!({"trades": [raw_trade("a", 100, 10.0)]});
        let Some(summary) = extract_summary(&raw) else {
            panic!("record with trades should extract");
        };
        assert_eq!(summary.starting_balance, DEFAULT_STARTING_BALANCE);
        assert_eq!(summary.backtest_id, "");
        assert_eq!(summary.timestamp, None);
    }

    #[test]
    fn test_extract_custom_fallback_balance() {
        let raw = json!({"trades": [raw_trade("a", 100, 10.0)], "starting_balance": "oops"});
        let Some(summary) = Extractor::new(500.0).extract(&raw) else {
            panic!("record with trades should extract");
        };
        assert_eq!(summary.starting_balance, 500.0);
    }

    #[test]
    fn test_extractor_fallback_balance_accessor() {
        assert_eq!(
            Extractor::default().default_starting_balance(),
            DEFAULT_STARTING_BALANCE
        );
        assert_eq!(Extractor::new(2_500.0).default_starting_balance(), 2_500.0);
    }

    #[test]
    fn test_extract_rejects_overflowing_totals() {
        let raw = json!({
            "backtest_id": "huge",
            "trades": [
                raw_trade("a", 100, 1e308),
                raw_trade("b", 200, 1e308),
                raw_trade("c", 300, -1e308),
            ],
        });

        assert!(extract_summary(&raw).is_none());
    }

    #[test]
    fn test_extract_keeps_large_finite_totals() {
        let raw = json!({
            "trades": [raw_trade("a", 100, 1e300), raw_trade("b", 200, -1e300)],
        });

        let Some(summary) = extract_summary(&raw) else {
            panic!("finite totals should extract");
        };
        assert!(summary.max_drawdown.is_finite());
    }

    #[test]
    fn test_extract_from_nested_runtime_data() {
        let raw = json!({
            "id": 17,
            "runtime_data": {"trades": [raw_trade("a", 100, 5.0)]},
        });
        let Some(summary) = extract_summary(&raw) else {
            panic!("nested trades should extract");
        };
        assert_eq!(summary.backtest_id, "17");
        assert_eq!(summary.total_trades, 1);
    }

    #[test]
    fn test_extract_skips_malformed_trades_only() {
        let raw = json!({
            "trades": [
                raw_trade("good", 100, 10.0),
                {"trade_id": "bad", "profit_loss": "not a number"},
                "not an object",
                {"trade_id": "sparse"},
            ],
        });
        let Some(summary) = extract_summary(&raw) else {
            panic!("partially valid record should extract");
        };
        assert_eq!(summary.total_trades, 2);
        let ids: Vec<&str> = summary.trades.iter().map(|t| t.trade_id.as_str()).collect();
        assert!(ids.contains(&"good"));
        assert!(ids.contains(&"sparse"));
    }

    #[test]
    fn test_extract_sparse_trade_defaults() {
        let raw = json!({"trades": [{}]});
        let Some(summary) = extract_summary(&raw) else {
            panic!("empty trade object is still a trade");
        };
        let trade = &summary.trades[0];
        assert_eq!(trade.trade_id, "");
        assert_eq!(trade.profit_loss, 0.0);
        assert_eq!(trade.side, TradeSide::Unknown);
        assert_eq!(summary.winning_trades + summary.losing_trades, 0);
    }

    #[test]
    fn test_extract_returns_none_without_data() {
        assert!(extract_summary(&json!({})).is_none());
        assert!(extract_summary(&json!({"trades": []})).is_none());
        assert!(extract_summary(&json!({"trades": ["x", 1]})).is_none());
        assert!(extract_summary(&json!([raw_trade("a", 1, 1.0)])).is_none());
        assert!(extract_summary(&json!(null)).is_none());
    }

    #[test]
    fn test_extract_with_restricted_sources() {
        let raw = json!({"trade_data": [raw_trade("a", 100, 10.0)]});
        let extractor = Extractor::default().with_trade_sources(vec![TradeListSource::Trades]);
        assert!(extractor.extract(&raw).is_none());
        assert!(Extractor::default().extract(&raw).is_some());
    }

    #[test]
    fn test_summary_sorts_by_exit_time() {
        let raw = json!({
            "starting_balance": 1000.0,
            "trades": [
                raw_trade("late", 300, -300.0),
                raw_trade("early", 100, 100.0),
                raw_trade("middle", 200, -50.0),
            ],
        });
        let Some(summary) = extract_summary(&raw) else {
            panic!("record with trades should extract");
        };
        let ids: Vec<&str> = summary.trades.iter().map(|t| t.trade_id.as_str()).collect();
        assert_eq!(ids, ["early", "middle", "late"]);
        // 1000 -> 1100 -> 1050 -> 750
        assert_eq!(summary.max_drawdown, 350.0);
    }

    #[test]
    fn test_break_even_trades_count_as_neither() {
        let summary = summarize_trades(
            "bt",
            "lab",
            1000.0,
            vec![
                parse_trade(&raw_trade("w", 1, 10.0)).unwrap(),
                parse_trade(&raw_trade("e", 2, 0.0)).unwrap(),
                parse_trade(&raw_trade("l", 3, -5.0)).unwrap(),
            ],
            None,
        );
        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.winning_trades, 1);
        assert_eq!(summary.losing_trades, 1);
        assert!((summary.win_rate - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_net_profit_subtracts_fees() {
        let mut trade = raw_trade("a", 1, 10.0);
        trade["fees"] = json!(2.5);
        let raw = json!({"starting_balance": 100.0, "trades": [trade]});
        let Some(summary) = extract_summary(&raw) else {
            panic!("record with trades should extract");
        };
        assert_eq!(summary.net_profit, 7.5);
        assert_eq!(summary.gross_profit, 10.0);
        assert_eq!(summary.final_balance, 107.5);
    }
}
