//! Batch analysis over many raw backtest records.
//!
//! Runs extraction, metrics and scoring for each record. Records without
//! usable data are counted and skipped. Work is spread over the rayon pool;
//! results keep input order.

use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::cache::CachedRecord;
use super::extraction::Extractor;
use super::metrics::{RunMetrics, compute_metrics};
use super::scoring::{ScoreBreakdown, ScoreWeights};
use super::types::BacktestSummary;

/// Full analysis of one backtest.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestAnalysis {
    /// Extracted summary.
    pub summary: BacktestSummary,
    /// Computed metrics.
    pub metrics: RunMetrics,
    /// Score and gate outcome.
    pub score: ScoreBreakdown,
    /// Cache file the record came from.
    pub source: Option<PathBuf>,
}

impl BacktestAnalysis {
    /// Analyze a raw record. `None` when the record holds no usable trades.
    #[must_use]
    pub fn from_raw(raw: &Value, extractor: &Extractor, weights: &ScoreWeights) -> Option<Self> {
        extractor
            .extract(raw)
            .map(|summary| Self::from_summary(summary, weights))
    }

    /// Analyze an already-extracted summary.
    #[must_use]
    pub fn from_summary(summary: BacktestSummary, weights: &ScoreWeights) -> Self {
        let metrics = compute_metrics(&summary);
        let score = ScoreBreakdown::evaluate(&metrics, weights);
        Self {
            summary,
            metrics,
            score,
            source: None,
        }
    }

    /// Analyze a cached record, filling missing identifiers from the file
    /// location.
    #[must_use]
    pub fn from_cached(
        record: &CachedRecord,
        extractor: &Extractor,
        weights: &ScoreWeights,
    ) -> Option<Self> {
        let mut analysis = Self::from_raw(&record.raw, extractor, weights)?;
        if analysis.summary.backtest_id.is_empty() {
            analysis.summary.backtest_id.clone_from(&record.id_hint);
        }
        if analysis.summary.lab_id.is_empty() {
            if let Some(lab) = &record.lab_hint {
                analysis.summary.lab_id.clone_from(lab);
            }
        }
        analysis.source = Some(record.source.clone());
        Some(analysis)
    }
}

/// Result of analyzing a batch of records.
#[derive(Debug, Default)]
pub struct BatchAnalysis {
    /// Analyses of records that had usable data, in input order.
    pub analyses: Vec<BacktestAnalysis>,
    /// Records skipped for lack of usable data.
    pub skipped: usize,
}

/// Analyze every cached record in parallel.
#[must_use]
pub fn analyze_records(
    records: &[CachedRecord],
    extractor: &Extractor,
    weights: &ScoreWeights,
) -> BatchAnalysis {
    let results: Vec<Option<BacktestAnalysis>> = records
        .par_iter()
        .map(|record| {
            let analysis = BacktestAnalysis::from_cached(record, extractor, weights);
            if analysis.is_none() {
                debug!(source = %record.source.display(), "No usable data in cached record");
            }
            analysis
        })
        .collect();

    let total = results.len();
    let analyses: Vec<BacktestAnalysis> = results.into_iter().flatten().collect();
    let skipped = total - analyses.len();

    info!(
        records = total,
        analyzed = analyses.len(),
        skipped,
        "Batch analysis complete"
    );

    BatchAnalysis { analyses, skipped }
}
