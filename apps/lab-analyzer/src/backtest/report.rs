//! Ranking and report rendering.
//!
//! Ranking answers "which backtests are worth turning into bots": filter by
//! hard floors, sort by composite score, keep the top N.

use std::fmt::Write;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::batch::BacktestAnalysis;
use super::metrics::{
    RunMetrics, format_decimal, format_duration, format_pct, format_rate, format_ratio,
};
use super::types::BacktestSummary;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// Comma-separated values.
    Csv,
    /// Pretty-printed JSON.
    Json,
}

/// Unknown output format name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown output format '{0}' (expected table, csv or json)")]
pub struct ParseFormatError(String);

impl FromStr for OutputFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// Filters and limits applied when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RankingOptions {
    /// Keep at most this many entries.
    pub top_n: Option<usize>,
    /// Drop backtests whose profit factor is below this floor.
    pub min_profit_factor: Option<f64>,
    /// Drop backtests with fewer trades than this.
    pub min_trades: Option<u64>,
}

/// One ranked backtest.
#[derive(Debug, Clone, Copy)]
pub struct RankedBacktest<'a> {
    /// 1-based position.
    pub rank: usize,
    /// Underlying analysis.
    pub analysis: &'a BacktestAnalysis,
}

impl RankedBacktest<'_> {
    fn row(&self) -> ReportRow<'_> {
        let summary = &self.analysis.summary;
        ReportRow {
            rank: self.rank,
            backtest_id: &summary.backtest_id,
            lab_id: &summary.lab_id,
            score: self.analysis.score.score,
            metrics: &self.analysis.metrics,
        }
    }
}

#[derive(Serialize)]
struct ReportRow<'a> {
    rank: usize,
    backtest_id: &'a str,
    lab_id: &'a str,
    score: f64,
    #[serde(flatten)]
    metrics: &'a RunMetrics,
}

/// Rank analyses by score, best first.
///
/// Ties are broken by backtest identifier so output is stable.
#[must_use]
pub fn rank<'a>(analyses: &'a [BacktestAnalysis], options: &RankingOptions) -> Vec<RankedBacktest<'a>> {
    let mut kept: Vec<&BacktestAnalysis> = analyses
        .iter()
        .filter(|a| {
            options
                .min_profit_factor
                .is_none_or(|floor| a.metrics.profit_factor >= floor)
        })
        .filter(|a| {
            options
                .min_trades
                .is_none_or(|floor| a.metrics.total_trades >= floor)
        })
        .collect();

    kept.sort_by(|a, b| {
        b.score
            .score
            .total_cmp(&a.score.score)
            .then_with(|| a.summary.backtest_id.cmp(&b.summary.backtest_id))
    });

    if let Some(n) = options.top_n {
        kept.truncate(n);
    }

    kept.into_iter()
        .enumerate()
        .map(|(i, analysis)| RankedBacktest {
            rank: i + 1,
            analysis,
        })
        .collect()
}

/// Render a ranking in the requested format.
pub fn render_ranking(
    ranked: &[RankedBacktest<'_>],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(ranking_table(ranked)),
        OutputFormat::Csv => Ok(ranking_csv(ranked)),
        OutputFormat::Json => {
            let rows: Vec<ReportRow<'_>> = ranked.iter().map(RankedBacktest::row).collect();
            serde_json::to_string_pretty(&rows)
        }
    }
}

/// Render a ranking as an aligned text table.
#[must_use]
pub fn ranking_table(ranked: &[RankedBacktest<'_>]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<24} {:<16} {:>10} {:>7} {:>8} {:>7} {:>12} {:>10} {:>8}",
        "#", "BACKTEST", "LAB", "SCORE", "TRADES", "WIN", "PF", "NET", "MAX DD", "SHARPE"
    );

    for entry in ranked {
        let s = &entry.analysis.summary;
        let m = &entry.analysis.metrics;
        let _ = writeln!(
            out,
            "{:>4}  {:<24} {:<16} {:>10} {:>7} {:>8} {:>7} {:>12} {:>10} {:>8}",
            entry.rank,
            truncate(&s.backtest_id, 24),
            truncate(&s.lab_id, 16),
            format_decimal(entry.analysis.score.score),
            m.total_trades,
            format_rate(m.win_rate),
            format_ratio(m.profit_factor),
            format_decimal(m.net_profit),
            format_pct(m.max_drawdown_pct),
            format_ratio(m.sharpe_ratio),
        );
    }

    if ranked.is_empty() {
        out.push_str("(no backtests matched)\n");
    }
    out
}

/// Render a ranking as CSV.
#[must_use]
pub fn ranking_csv(ranked: &[RankedBacktest<'_>]) -> String {
    let mut csv = String::from(
        "rank,backtest_id,lab_id,score,total_trades,win_rate,profit_factor,net_profit,roe_pct,max_drawdown,max_drawdown_pct,volatility,sharpe_ratio,sortino_ratio,expectancy,avg_trade_duration_seconds\n",
    );

    for entry in ranked {
        let s = &entry.analysis.summary;
        let m = &entry.analysis.metrics;
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            entry.rank,
            csv_field(&s.backtest_id),
            csv_field(&s.lab_id),
            entry.analysis.score.score,
            m.total_trades,
            m.win_rate,
            m.profit_factor,
            m.net_profit,
            m.roe_pct,
            m.max_drawdown,
            m.max_drawdown_pct,
            m.volatility,
            m.sharpe_ratio,
            m.sortino_ratio,
            m.expectancy,
            m.avg_trade_duration_seconds,
        );
    }

    csv
}

/// Render the detail view of one backtest.
#[must_use]
pub fn render_detail(analysis: &BacktestAnalysis) -> String {
    let s = &analysis.summary;
    let m = &analysis.metrics;
    let score = &analysis.score;
    let mut out = String::new();

    let _ = writeln!(out, "Backtest {}", s.backtest_id);
    let _ = writeln!(out, "  Lab:                {}", s.lab_id);
    if let Some(ts) = s.timestamp {
        let _ = writeln!(out, "  Run at:             {}", format_timestamp(ts));
    }
    if let Some(source) = &analysis.source {
        let _ = writeln!(out, "  Source:             {}", source.display());
    }

    let _ = writeln!(out, "\nBalance");
    let _ = writeln!(out, "  Starting:           {}", format_decimal(s.starting_balance));
    let _ = writeln!(out, "  Final:              {}", format_decimal(s.final_balance));
    let _ = writeln!(out, "  Peak:               {}", format_decimal(s.peak_balance));
    let _ = writeln!(out, "  Net profit:         {}", format_decimal(s.net_profit));
    let _ = writeln!(out, "  ROE:                {}", format_pct(m.roe_pct));
    let _ = writeln!(
        out,
        "  Max drawdown:       {} ({})",
        format_decimal(s.max_drawdown),
        format_pct(s.max_drawdown_pct)
    );

    let _ = writeln!(out, "\nTrades");
    let _ = writeln!(
        out,
        "  Total:              {} ({} won, {} lost)",
        s.total_trades, s.winning_trades, s.losing_trades
    );
    let _ = writeln!(out, "  Win rate:           {}", format_rate(s.win_rate));
    let _ = writeln!(out, "  Profit factor:      {}", format_ratio(m.profit_factor));
    let _ = writeln!(out, "  Expectancy:         {}", format_decimal(m.expectancy));
    let _ = writeln!(
        out,
        "  Avg win / loss:     {} / {} (payoff {})",
        format_decimal(m.avg_win),
        format_decimal(m.avg_loss),
        format_ratio(m.payoff_ratio)
    );
    let _ = writeln!(
        out,
        "  Streaks:            {} wins, {} losses",
        m.max_consecutive_wins, m.max_consecutive_losses
    );
    let _ = writeln!(
        out,
        "  Exposure:           {} (avg {})",
        format_duration(m.exposure_seconds as f64),
        format_duration(m.avg_trade_duration_seconds)
    );

    let _ = writeln!(out, "\nRisk");
    let _ = writeln!(out, "  Volatility:         {}", format_decimal(m.volatility));
    let _ = writeln!(out, "  Downside deviation: {}", format_decimal(m.downside_deviation));
    let _ = writeln!(out, "  Sharpe proxy:       {}", format_ratio(m.sharpe_ratio));
    let _ = writeln!(out, "  Sortino proxy:      {}", format_ratio(m.sortino_ratio));

    let _ = writeln!(out, "\nScore");
    let _ = writeln!(out, "  Base:               {}", format_decimal(score.base));
    if score.min_trades_penalty {
        let _ = writeln!(out, "  Penalty:            too few trades (x0.5)");
    }
    if score.profit_factor_penalty {
        let _ = writeln!(out, "  Penalty:            low profit factor (x0.7)");
    }
    let _ = writeln!(out, "  Final:              {}", format_decimal(score.score));

    out
}

/// Export the trades of a backtest as CSV.
#[must_use]
pub fn trades_csv(summary: &BacktestSummary) -> String {
    let mut csv = String::from(
        "trade_id,market,side,entry_time,exit_time,entry_price,exit_price,quantity,profit_loss,fees,net_pnl,duration_seconds\n",
    );

    for trade in &summary.trades {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            csv_field(&trade.trade_id),
            csv_field(&trade.market),
            trade.side,
            trade.entry_time,
            trade.exit_time,
            trade.entry_price,
            trade.exit_price,
            trade.quantity,
            trade.profit_loss,
            trade.fees,
            trade.net_pnl(),
            trade.duration_seconds,
        );
    }

    csv
}

/// Render epoch seconds as RFC 3339, or the raw number if out of range.
#[must_use]
pub fn format_timestamp(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map_or_else(|| epoch_seconds.to_string(), |dt| dt.to_rfc3339())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
