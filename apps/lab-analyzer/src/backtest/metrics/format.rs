//! Formatting utilities for metrics display.

/// Format an already-scaled percentage value, e.g. `12.345` → `"12.35%"`.
#[must_use]
pub fn format_pct(value: f64) -> String {
    format!("{value:.2}%")
}

/// Format a fraction as a percentage, e.g. `0.5` → `"50.00%"`.
#[must_use]
pub fn format_rate(value: f64) -> String {
    format_pct(value * 100.0)
}

/// Format a value with 2 decimal places.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    format!("{value:.2}")
}

/// Format a ratio that may be unbounded.
#[must_use]
pub fn format_ratio(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Format a duration in seconds as `1d 02h 03m`, `2h 03m` or `45s`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours:02}h {minutes:02}m")
    } else if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {:02}s", total % 60)
    } else {
        format!("{total}s")
    }
}
