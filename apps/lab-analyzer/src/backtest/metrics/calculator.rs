//! Metrics calculation from a backtest summary.

use super::math::{downside_deviation, mean, ratio_or_zero, sample_std_dev};
use super::types::RunMetrics;
use crate::backtest::types::BacktestSummary;

/// Compute the performance metrics of one backtest.
///
/// Pure and deterministic: calling it twice on the same summary yields
/// bit-identical output. An empty trade list produces zeros, never `NaN`.
#[must_use]
pub fn compute_metrics(summary: &BacktestSummary) -> RunMetrics {
    let net: Vec<f64> = summary.trades.iter().map(|t| t.net_pnl()).collect();
    let total_trades = summary.total_trades;

    let stats = TradeStats::from_net(&net);

    let avg_win = ratio_or_zero(stats.gross_profit, stats.wins as f64);
    let avg_loss = ratio_or_zero(stats.gross_loss, stats.losses as f64);

    // Expectancy = P(win) * AvgWin - P(loss) * AvgLoss
    let (p_win, p_loss) = if net.is_empty() {
        (0.0, 0.0)
    } else {
        let n = net.len() as f64;
        (stats.wins as f64 / n, stats.losses as f64 / n)
    };
    let expectancy = p_win.mul_add(avg_win, -(p_loss * avg_loss));

    let volatility = sample_std_dev(&net);
    let downside = downside_deviation(&net);
    let avg_pnl = mean(&net);

    let exposure_seconds = summary
        .trades
        .iter()
        .map(|t| t.duration_seconds)
        .fold(0i64, i64::saturating_add);
    let avg_trade_duration_seconds = ratio_or_zero(exposure_seconds as f64, net.len() as f64);

    let (max_consecutive_wins, max_consecutive_losses) = consecutive_streaks(&net);

    let roe_pct = if summary.starting_balance > 0.0 {
        summary.net_profit / summary.starting_balance * 100.0
    } else {
        0.0
    };

    RunMetrics {
        total_trades,
        win_rate: summary.win_rate,
        gross_profit: stats.gross_profit,
        gross_loss: stats.gross_loss,
        net_profit: summary.net_profit,
        roe_pct,
        profit_factor: unbounded_ratio(stats.gross_profit, stats.gross_loss),
        expectancy,
        avg_win,
        avg_loss,
        payoff_ratio: unbounded_ratio(avg_win, avg_loss),
        volatility,
        downside_deviation: downside,
        sharpe_ratio: ratio_or_zero(avg_pnl, volatility),
        sortino_ratio: ratio_or_zero(avg_pnl, downside),
        max_drawdown: summary.max_drawdown,
        max_drawdown_pct: summary.max_drawdown_pct,
        exposure_seconds,
        avg_trade_duration_seconds,
        max_consecutive_wins,
        max_consecutive_losses,
    }
}

/// Gross win/loss aggregation over a net P&L series.
#[derive(Debug, Default)]
struct TradeStats {
    gross_profit: f64,
    gross_loss: f64,
    wins: u64,
    losses: u64,
}

impl TradeStats {
    fn from_net(net: &[f64]) -> Self {
        let mut stats = Self::default();
        for pnl in net {
            if *pnl > 0.0 {
                stats.gross_profit += pnl;
                stats.wins += 1;
            } else if *pnl < 0.0 {
                stats.gross_loss += pnl.abs();
                stats.losses += 1;
            }
        }
        stats
    }
}

/// `gain / loss` where a zero `loss` means +inf if there was any gain, else 0.
fn unbounded_ratio(gain: f64, loss: f64) -> f64 {
    if loss > 0.0 {
        gain / loss
    } else if gain > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

fn consecutive_streaks(net: &[f64]) -> (u64, u64) {
    let mut max_wins = 0u64;
    let mut max_losses = 0u64;
    let mut current_wins = 0u64;
    let mut current_losses = 0u64;

    for pnl in net {
        if *pnl > 0.0 {
            current_wins += 1;
            current_losses = 0;
            max_wins = max_wins.max(current_wins);
        } else if *pnl < 0.0 {
            current_losses += 1;
            current_wins = 0;
            max_losses = max_losses.max(current_losses);
        }
    }

    (max_wins, max_losses)
}
