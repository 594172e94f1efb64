//! Running-balance drawdown tracking.

/// Drawdown statistics over a balance walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownStats {
    /// Largest observed `peak - balance`.
    pub max_drawdown: f64,
    /// `max_drawdown` as a percentage of the peak at that step.
    pub max_drawdown_pct: f64,
    /// Highest balance reached, including the starting balance.
    pub peak_balance: f64,
    /// Balance after the last delta.
    pub final_balance: f64,
}

/// Walk `deltas` from `starting_balance`, tracking peak and drawdown.
///
/// The peak starts at the starting balance. The percentage reported is the
/// one measured at the step with the largest absolute drawdown, and is zero
/// when that peak is not positive.
#[must_use]
pub fn track_drawdown(starting_balance: f64, deltas: impl IntoIterator<Item = f64>) -> DrawdownStats {
    let mut balance = starting_balance;
    let mut peak = starting_balance;
    let mut max_drawdown = 0.0;
    let mut max_drawdown_pct = 0.0;

    for delta in deltas {
        balance += delta;
        if balance > peak {
            peak = balance;
            continue;
        }

        let drawdown = peak - balance;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
            max_drawdown_pct = if peak > 0.0 {
                drawdown / peak * 100.0
            } else {
                0.0
            };
        }
    }

    DrawdownStats {
        max_drawdown,
        max_drawdown_pct,
        peak_balance: peak,
        final_balance: balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawdown_from_peak_to_trough() {
        // Balances after each trade: 1000, 1100, 1050, 1200, 900
        let stats = track_drawdown(1000.0, [0.0, 100.0, -50.0, 150.0, -300.0]);
        assert_eq!(stats.max_drawdown, 300.0);
        assert_eq!(stats.max_drawdown_pct, 25.0);
        assert_eq!(stats.peak_balance, 1200.0);
        assert_eq!(stats.final_balance, 900.0);
    }

    #[test]
    fn test_drawdown_monotonic_rise() {
        let stats = track_drawdown(1000.0, [10.0, 20.0, 30.0]);
        assert_eq!(stats.max_drawdown, 0.0);
        assert_eq!(stats.max_drawdown_pct, 0.0);
        assert_eq!(stats.peak_balance, 1060.0);
    }

    #[test]
    fn test_drawdown_below_start() {
        let stats = track_drawdown(1000.0, [-100.0, 50.0, -200.0]);
        assert_eq!(stats.max_drawdown, 250.0);
        assert_eq!(stats.max_drawdown_pct, 25.0);
        assert_eq!(stats.peak_balance, 1000.0);
        assert_eq!(stats.final_balance, 750.0);
    }

    #[test]
    fn test_drawdown_pct_zero_without_positive_peak() {
        let stats = track_drawdown(0.0, [-10.0]);
        assert_eq!(stats.max_drawdown, 10.0);
        assert_eq!(stats.max_drawdown_pct, 0.0);
    }

    #[test]
    fn test_drawdown_no_deltas() {
        let stats = track_drawdown(500.0, std::iter::empty());
        assert_eq!(stats.final_balance, 500.0);
        assert_eq!(stats.max_drawdown, 0.0);
    }
}
