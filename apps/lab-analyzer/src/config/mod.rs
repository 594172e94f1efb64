//! Configuration module for the lab analyzer.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates score weights, report settings and logging options.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lab_analyzer::config::load_config;
//!
//! // Load from default path (lab-analyzer.yaml), falling back to defaults
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/analyzer.yaml"))?;
//!
//! println!("cache dir: {}", config.cache.dir.display());
//! ```

mod analysis;
mod observability;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use analysis::{CacheConfig, ExtractionConfig, ReportConfig};
pub use observability::{LogFormat, LoggingConfig};

use crate::backtest::ScoreWeights;

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "lab-analyzer.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backtest cache location.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Extraction settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Composite score weights and gates.
    #[serde(default)]
    pub scoring: ScoreWeights,
    /// Ranking report settings.
    #[serde(default)]
    pub report: ReportConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// With `None`, reads [`DEFAULT_CONFIG_PATH`] if it exists and returns the
/// defaults otherwise. An explicit path must exist.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => DEFAULT_CONFIG_PATH,
        None => return Ok(Config::default()),
    };

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    if interpolated.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is a constant pattern
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let var_name = &cap[1];
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let weights = &config.scoring;
    let named = [
        ("roi_weight", weights.roi_weight),
        ("drawdown_weight", weights.drawdown_weight),
        ("volatility_weight", weights.volatility_weight),
        ("profit_factor_weight", weights.profit_factor_weight),
        ("win_rate_weight", weights.win_rate_weight),
        ("min_profit_factor", weights.min_profit_factor),
    ];
    for (name, value) in named {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "scoring.{name} must be a finite non-negative number"
            )));
        }
    }

    let balance = config.extraction.default_starting_balance;
    if !balance.is_finite() || balance <= 0.0 {
        return Err(ConfigError::ValidationError(
            "extraction.default_starting_balance must be positive".to_string(),
        ));
    }

    if config.report.top_n == 0 {
        return Err(ConfigError::ValidationError(
            "report.top_n must be at least 1".to_string(),
        ));
    }

    if config
        .report
        .min_profit_factor
        .is_some_and(|pf| pf.is_nan() || pf < 0.0)
    {
        return Err(ConfigError::ValidationError(
            "report.min_profit_factor must be non-negative".to_string(),
        ));
    }

    if config.logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "logging.level must not be empty".to_string(),
        ));
    }

    Ok(())
}
