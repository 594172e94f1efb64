//! Cache, extraction and report configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::backtest::{DEFAULT_STARTING_BALANCE, OutputFormat, RankingOptions};

/// Backtest cache location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Root directory of cached backtest JSON files.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache/backtests")
}

/// Extraction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Starting balance for records that do not carry one.
    #[serde(default = "default_starting_balance")]
    pub default_starting_balance: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_starting_balance: default_starting_balance(),
        }
    }
}

const fn default_starting_balance() -> f64 {
    DEFAULT_STARTING_BALANCE
}

/// Ranking report settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of backtests to show.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Hide backtests below this profit factor.
    #[serde(default)]
    pub min_profit_factor: Option<f64>,
    /// Hide backtests with fewer trades than this.
    #[serde(default)]
    pub min_trades: Option<u64>,
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            min_profit_factor: None,
            min_trades: None,
            format: OutputFormat::default(),
        }
    }
}

impl ReportConfig {
    /// Ranking options implied by this report configuration.
    #[must_use]
    pub const fn ranking_options(&self) -> RankingOptions {
        RankingOptions {
            top_n: Some(self.top_n),
            min_profit_factor: self.min_profit_factor,
            min_trades: self.min_trades,
        }
    }
}

const fn default_top_n() -> usize {
    10
}
