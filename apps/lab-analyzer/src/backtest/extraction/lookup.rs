//! Ordered field lookup over raw backtest records.
//!
//! Vendor payloads are not uniform: depending on the endpoint and API
//! version, the same datum lives under different keys. Lookups are expressed
//! as an ordered list of candidate paths tried until one yields a usable
//! value.

use std::fmt;

use serde_json::Value;

/// Dotted path into a JSON object, e.g. `runtime_data.trades`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static [&'static str]);

impl FieldPath {
    /// Create a path from its segments.
    #[must_use]
    pub const fn new(segments: &'static [&'static str]) -> Self {
        Self(segments)
    }

    /// Resolve the path against `root`. Returns `None` if any segment is
    /// missing or a non-object is traversed.
    #[must_use]
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .try_fold(root, |node, segment| node.as_object()?.get(*segment))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Try `paths` in order and return the first non-null value.
#[must_use]
pub fn first_present<'a>(root: &'a Value, paths: &[FieldPath]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| path.resolve(root))
        .find(|value| !value.is_null())
}

/// Known locations of the trade list in a raw backtest record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeListSource {
    /// Top-level `trades`.
    Trades,
    /// Top-level `trade_data`.
    TradeData,
    /// Nested `runtime_data.trades`.
    RuntimeDataTrades,
}

impl TradeListSource {
    /// Default probing order.
    pub const ALL: [Self; 3] = [Self::Trades, Self::TradeData, Self::RuntimeDataTrades];

    /// Path this source reads from.
    #[must_use]
    pub const fn path(self) -> FieldPath {
        match self {
            Self::Trades => FieldPath::new(&["trades"]),
            Self::TradeData => FieldPath::new(&["trade_data"]),
            Self::RuntimeDataTrades => FieldPath::new(&["runtime_data", "trades"]),
        }
    }

    /// Resolve this source to a non-empty trade array.
    #[must_use]
    pub fn locate(self, root: &Value) -> Option<&Vec<Value>> {
        self.path()
            .resolve(root)
            .and_then(Value::as_array)
            .filter(|trades| !trades.is_empty())
    }
}

/// Try `sources` in order and return the first non-empty trade array.
#[must_use]
pub fn locate_trades<'a>(
    root: &'a Value,
    sources: &[TradeListSource],
) -> Option<(TradeListSource, &'a Vec<Value>)> {
    sources
        .iter()
        .find_map(|source| source.locate(root).map(|trades| (*source, trades)))
}
