//! Statistical helpers for metric calculations.
//!
//! All helpers return `0.0` instead of `NaN` on degenerate input.

/// Arithmetic mean; `0.0` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); `0.0` for fewer than two values.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let avg = mean(values);
    let variance_sum: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    (variance_sum / (values.len() - 1) as f64).sqrt()
}

/// Downside deviation: root mean square of the negative values, measured
/// from zero over the total count. `0.0` for fewer than two values.
#[must_use]
pub fn downside_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let variance_sum: f64 = values
        .iter()
        .filter(|v| **v < 0.0)
        .map(|v| v * v)
        .sum();
    (variance_sum / values.len() as f64).sqrt()
}

/// `numerator / denominator`, or `0.0` when the denominator is zero.
#[must_use]
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
