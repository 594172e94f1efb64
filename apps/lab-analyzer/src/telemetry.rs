//! Tracing Setup
//!
//! Initializes the `tracing` subscriber for the analyzer. Log lines go to
//! stderr so reports written to stdout stay machine-readable.
//!
//! # Configuration
//!
//! - `RUST_LOG`: overrides `logging.level` from the config file
//! - `logging.format`: `pretty` (default) or `json`
//!
//! # Usage
//!
//! ```rust,ignore
//! use lab_analyzer::{config::LoggingConfig, telemetry::init_telemetry};
//!
//! init_telemetry(&LoggingConfig::default())?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Error returned when a global subscriber is already installed.
pub type TelemetryError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the level filter, preferring `RUST_LOG` over the configured level.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init_telemetry(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config);

    match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
    }?;

    tracing::debug!(level = %config.level, format = ?config.format, "Tracing initialized");
    Ok(())
}
