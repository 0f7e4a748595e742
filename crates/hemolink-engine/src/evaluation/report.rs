//! Per-strategy aggregates, composite comparison and export.

use anyhow::{Context, Result};
use hemolink_config::{EvaluationConfig, StrategyKind};
use hemolink_core::metrics::mean;
use hemolink_core::RankedResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CellStatus {
    Completed,
    Failed { error: String },
    Cancelled,
}

/// Metrics for one query×strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub reciprocal_rank: f64,
    pub ndcg: f64,
    pub precision: f64,
    /// Mean requester distance of the returned results; `None` for an
    /// empty run.
    pub avg_distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRun {
    pub query_index: usize,
    pub query: String,
    pub strategy: StrategyKind,
    pub status: CellStatus,
    pub results: Vec<RankedResult>,
    pub excluded: usize,
    pub metrics: Option<RunMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy: StrategyKind,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub mrr: f64,
    pub ndcg: f64,
    pub precision: f64,
    pub avg_distance_km: Option<f64>,
    pub norm_distance: f64,
    pub final_score: f64,
}

/// Wall-clock cost per strategy, kept apart from the metrics so that
/// repeated runs over the same inputs compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTiming {
    pub strategy: StrategyKind,
    pub mean_latency_ms: f64,
}

/// Which strategy wins each metric. Ties go to the earlier strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestOf {
    pub mrr: Option<StrategyKind>,
    pub ndcg: Option<StrategyKind>,
    pub precision: Option<StrategyKind>,
    pub distance: Option<StrategyKind>,
    pub final_score: Option<StrategyKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub mrr: f64,
    pub ndcg: f64,
    pub distance: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            mrr: 0.4,
            ndcg: 0.4,
            distance: 0.2,
        }
    }
}

impl From<&EvaluationConfig> for CompositeWeights {
    fn from(config: &EvaluationConfig) -> Self {
        Self {
            mrr: config.mrr_weight,
            ndcg: config.ndcg_weight,
            distance: config.distance_weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub k: usize,
    /// In the order the strategies were requested.
    pub summaries: Vec<StrategySummary>,
    /// Strategies by descending final score.
    pub ranking: Vec<StrategyKind>,
    pub best: BestOf,
    pub runs: Vec<StrategyRun>,
    pub timings: Vec<StrategyTiming>,
    pub cancelled: bool,
}

impl EvaluationReport {
    /// Aggregates completed runs per strategy. Failed and cancelled cells
    /// are counted but contribute nothing to the means.
    pub fn build(
        k: usize,
        strategies: &[StrategyKind],
        runs: Vec<StrategyRun>,
        timings: Vec<StrategyTiming>,
        weights: CompositeWeights,
    ) -> Self {
        let mut summaries: Vec<StrategySummary> = strategies
            .iter()
            .map(|&strategy| summarize(strategy, &runs))
            .collect();

        let max_avg = summaries
            .iter()
            .filter_map(|s| s.avg_distance_km)
            .fold(0.0_f64, f64::max);
        for summary in &mut summaries {
            summary.norm_distance = match summary.avg_distance_km {
                Some(avg) if max_avg > 0.0 => 1.0 - avg / max_avg,
                _ => 0.0,
            };
            summary.final_score = weights.mrr * summary.mrr
                + weights.ndcg * summary.ndcg
                + weights.distance * summary.norm_distance;
        }

        let mut order: Vec<&StrategySummary> = summaries.iter().collect();
        order.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        let ranking = order.iter().map(|s| s.strategy).collect();

        let best = BestOf {
            mrr: best_by(&summaries, |s| Some(s.mrr)),
            ndcg: best_by(&summaries, |s| Some(s.ndcg)),
            precision: best_by(&summaries, |s| Some(s.precision)),
            distance: best_by(&summaries, |s| s.avg_distance_km.map(|d| -d)),
            final_score: best_by(&summaries, |s| Some(s.final_score)),
        };

        let cancelled = runs.iter().any(|r| r.status == CellStatus::Cancelled);

        Self {
            k,
            summaries,
            ranking,
            best,
            runs,
            timings,
            cancelled,
        }
    }

    pub fn summary(&self, strategy: StrategyKind) -> Option<&StrategySummary> {
        self.summaries.iter().find(|s| s.strategy == strategy)
    }

    pub fn failed_runs(&self) -> impl Iterator<Item = &StrategyRun> {
        self.runs
            .iter()
            .filter(|r| matches!(r.status, CellStatus::Failed { .. }))
    }

    pub fn timing(&self, strategy: StrategyKind) -> Option<&StrategyTiming> {
        self.timings.iter().find(|t| t.strategy == strategy)
    }

    /// One row per strategy: System, MRR, NDCG@K, Precision@K, AvgDistance,
    /// NormDistance, FinalScore, Latency (mean milliseconds per cell).
    pub fn to_csv(&self) -> String {
        let mut out = format!(
            "System,MRR,NDCG@{k},Precision@{k},AvgDistance,NormDistance,FinalScore,Latency\n",
            k = self.k
        );
        for s in &self.summaries {
            let avg = s.avg_distance_km.map(|d| format!("{:.4}", d)).unwrap_or_default();
            let latency = self
                .timing(s.strategy)
                .map(|t| format!("{:.1}", t.mean_latency_ms))
                .unwrap_or_default();
            out.push_str(&format!(
                "{},{:.4},{:.4},{:.4},{},{:.4},{:.4},{}\n",
                s.strategy, s.mrr, s.ndcg, s.precision, avg, s.norm_distance, s.final_score, latency
            ));
        }
        out
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_csv())
            .with_context(|| format!("failed to write CSV report to {}", path.display()))
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write JSON report to {}", path.display()))
    }
}

fn summarize(strategy: StrategyKind, runs: &[StrategyRun]) -> StrategySummary {
    let mut completed = Vec::new();
    let (mut failed, mut cancelled) = (0, 0);
    for run in runs.iter().filter(|r| r.strategy == strategy) {
        match (&run.status, &run.metrics) {
            (CellStatus::Completed, Some(metrics)) => completed.push(metrics),
            (CellStatus::Cancelled, _) => cancelled += 1,
            _ => failed += 1,
        }
    }

    let collect = |f: fn(&RunMetrics) -> f64| completed.iter().map(|m| f(m)).collect::<Vec<_>>();
    let distances: Vec<f64> = completed.iter().filter_map(|m| m.avg_distance_km).collect();

    StrategySummary {
        strategy,
        completed: completed.len(),
        failed,
        cancelled,
        mrr: mean(&collect(|m| m.reciprocal_rank)),
        ndcg: mean(&collect(|m| m.ndcg)),
        precision: mean(&collect(|m| m.precision)),
        avg_distance_km: (!distances.is_empty()).then(|| mean(&distances)),
        norm_distance: 0.0,
        final_score: 0.0,
    }
}

fn best_by<F>(summaries: &[StrategySummary], key: F) -> Option<StrategyKind>
where
    F: Fn(&StrategySummary) -> Option<f64>,
{
    let mut best: Option<(f64, StrategyKind)> = None;
    for summary in summaries {
        if let Some(value) = key(summary) {
            if best.map_or(true, |(top, _)| value > top) {
                best = Some((value, summary.strategy));
            }
        }
    }
    best.map(|(_, strategy)| strategy)
}
