//! Property Tests for Extraction, Metrics, Scoring and Ranking

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used, clippy::float_cmp)]

use proptest::prelude::*;
use serde_json::{Value, json};

use lab_analyzer::backtest::{
    BacktestAnalysis, MIN_PROFIT_FACTOR_PENALTY, MIN_TRADES_PENALTY, RankingOptions,
    ScoreBreakdown, ScoreWeights, compute_metrics, extract_summary, rank,
};

fn raw_record(pnls: &[f64], fees: f64) -> Value {
    let trades: Vec<Value> = pnls
        .iter()
        .enumerate()
        .map(|(i, pnl)| {
            json!({
                "trade_id": format!("t{i}"),
                "exit_time": i,
                "profit_loss": pnl,
                "fees": fees,
                "duration_seconds": 60,
            })
        })
        .collect();
    json!({"starting_balance": 5_000.0, "trades": trades})
}

fn pnl_series() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![Just(0.0), -1_000.0f64..1_000.0],
        1..40,
    )
}

proptest! {
    #[test]
    fn win_loss_counts_bounded_by_total(pnls in pnl_series()) {
        let summary = extract_summary(&raw_record(&pnls, 0.0)).unwrap();

        prop_assert_eq!(summary.total_trades, pnls.len() as u64);
        prop_assert!(summary.winning_trades + summary.losing_trades <= summary.total_trades);
        let break_even = pnls.iter().filter(|p| **p == 0.0).count() as u64;
        prop_assert_eq!(
            summary.winning_trades + summary.losing_trades + break_even,
            summary.total_trades
        );
    }

    #[test]
    fn drawdown_is_non_negative(pnls in pnl_series(), fees in 0.0f64..5.0) {
        let summary = extract_summary(&raw_record(&pnls, fees)).unwrap();

        prop_assert!(summary.max_drawdown >= 0.0);
        prop_assert!(summary.max_drawdown_pct >= 0.0);
        prop_assert!(summary.peak_balance >= summary.starting_balance);
        prop_assert!(summary.peak_balance >= summary.final_balance);
    }

    #[test]
    fn final_balance_matches_net_profit(pnls in pnl_series(), fees in 0.0f64..5.0) {
        let summary = extract_summary(&raw_record(&pnls, fees)).unwrap();

        let expected = summary.starting_balance + summary.net_profit;
        prop_assert!((summary.final_balance - expected).abs() < 1e-6);
    }

    #[test]
    fn metrics_are_idempotent(pnls in pnl_series()) {
        let summary = extract_summary(&raw_record(&pnls, 0.0)).unwrap();

        prop_assert_eq!(compute_metrics(&summary), compute_metrics(&summary));
    }

    #[test]
    fn metrics_never_nan(pnls in pnl_series(), fees in 0.0f64..5.0) {
        let summary = extract_summary(&raw_record(&pnls, fees)).unwrap();
        let m = compute_metrics(&summary);

        for value in [
            m.win_rate, m.profit_factor, m.expectancy, m.volatility,
            m.downside_deviation, m.sharpe_ratio, m.sortino_ratio, m.payoff_ratio,
        ] {
            prop_assert!(!value.is_nan());
        }
        prop_assert!(m.volatility >= 0.0);
        prop_assert!(m.profit_factor >= 0.0);
    }

    #[test]
    fn score_applies_gate_multipliers(pnls in pnl_series()) {
        let summary = extract_summary(&raw_record(&pnls, 0.0)).unwrap();
        let metrics = compute_metrics(&summary);
        let breakdown = ScoreBreakdown::evaluate(&metrics, &ScoreWeights::default());

        let mut expected = breakdown.base;
        if breakdown.min_trades_penalty {
            expected *= MIN_TRADES_PENALTY;
        }
        if breakdown.profit_factor_penalty {
            expected *= MIN_PROFIT_FACTOR_PENALTY;
        }
        prop_assert_eq!(breakdown.score, expected);
        prop_assert_eq!(breakdown.min_trades_penalty, metrics.total_trades < 10);
    }

    #[test]
    fn ranking_is_sorted_and_numbered(
        series in prop::collection::vec(pnl_series(), 1..12),
        top_n in proptest::option::of(1usize..15),
    ) {
        let weights = ScoreWeights::default();
        let analyses: Vec<BacktestAnalysis> = series
            .iter()
            .enumerate()
            .map(|(i, pnls)| {
                let mut summary = extract_summary(&raw_record(pnls, 0.0)).unwrap();
                summary.backtest_id = format!("bt-{i:02}");
                BacktestAnalysis::from_summary(summary, &weights)
            })
            .collect();

        let ranked = rank(&analyses, &RankingOptions { top_n, ..RankingOptions::default() });

        prop_assert_eq!(ranked.len(), top_n.map_or(analyses.len(), |n| n.min(analyses.len())));
        for (i, entry) in ranked.iter().enumerate() {
            prop_assert_eq!(entry.rank, i + 1);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].analysis.score.score >= pair[1].analysis.score.score);
        }
    }

    #[test]
    fn numeric_strings_extract_like_numbers(pnls in pnl_series()) {
        let as_strings: Vec<Value> = pnls
            .iter()
            .enumerate()
            .map(|(i, pnl)| json!({"exit_time": i.to_string(), "profit_loss": pnl.to_string()}))
            .collect();
        let stringly = json!({"starting_balance": "5000", "trades": as_strings});

        let a = extract_summary(&raw_record(&pnls, 0.0)).unwrap();
        let b = extract_summary(&stringly).unwrap();

        prop_assert_eq!(a.total_trades, b.total_trades);
        prop_assert_eq!(a.net_profit, b.net_profit);
        prop_assert_eq!(a.max_drawdown, b.max_drawdown);
    }
}
