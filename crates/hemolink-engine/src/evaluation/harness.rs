use crate::evaluation::cancel::Cancellation;
use crate::evaluation::report::{
    CellStatus, CompositeWeights, EvaluationReport, RunMetrics, StrategyRun, StrategyTiming,
};
use crate::search::RecommendService;
use futures::stream::{self, StreamExt};
use hemolink_config::{Config, EvaluationConfig, StrategyKind};
use hemolink_core::metrics::{mean, ndcg_at_k, precision_at_k, reciprocal_rank};
use hemolink_core::relevance::is_operationally_relevant;
use hemolink_core::{BloodType, Query, RankError, RankedResult, RelevanceJudge};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct HarnessSettings {
    /// Results per run and cut-off for NDCG@K and Precision@K.
    pub k: usize,
    /// Cells in flight at once.
    pub concurrency: usize,
    /// Upper bound on a whole cell (embed + fetch + rank).
    pub cell_timeout: Duration,
    pub weights: CompositeWeights,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            k: 5,
            concurrency: 4,
            cell_timeout: Duration::from_secs(90),
            weights: CompositeWeights::default(),
        }
    }
}

/// Builds the evaluation query set from config: every query shares the
/// configured city, requester location and blood type.
pub fn queries_from_config(config: &EvaluationConfig) -> Result<Vec<Query>, RankError> {
    let blood_type: BloodType = config.blood_type.parse()?;
    Ok(config
        .queries
        .iter()
        .map(|text| {
            Query::new(text.clone(), blood_type, config.user_lat, config.user_lon)
                .in_city(config.city.clone())
        })
        .collect())
}

struct CellOutcome {
    query_index: usize,
    strategy_index: usize,
    run: StrategyRun,
    latency: Option<Duration>,
}

pub struct EvaluationHarness {
    service: Arc<RecommendService>,
    judge: RelevanceJudge,
    settings: HarnessSettings,
}

impl EvaluationHarness {
    pub fn new(service: Arc<RecommendService>, judge: RelevanceJudge, settings: HarnessSettings) -> Self {
        Self {
            service,
            judge,
            settings,
        }
    }

    pub fn from_config(service: Arc<RecommendService>, config: &Config) -> Self {
        let settings = HarnessSettings {
            k: config.evaluation.k,
            concurrency: config.evaluation.concurrency,
            cell_timeout: service.call_budget(),
            weights: CompositeWeights::from(&config.evaluation),
        };
        Self::new(service, RelevanceJudge::from_config(&config.relevance), settings)
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Runs every query against every strategy and aggregates the results.
    ///
    /// Cells run concurrently up to `settings.concurrency`. A failed cell is
    /// recorded and the run continues. Once `cancel` is raised, cells that
    /// have not started are marked cancelled and the partial aggregates are
    /// still returned.
    pub async fn evaluate(
        &self,
        queries: &[Query],
        strategies: &[StrategyKind],
        cancel: &Cancellation,
    ) -> EvaluationReport {
        let cells: Vec<(usize, usize)> = (0..queries.len())
            .flat_map(|qi| (0..strategies.len()).map(move |si| (qi, si)))
            .collect();
        info!(
            queries = queries.len(),
            strategies = strategies.len(),
            cells = cells.len(),
            "starting evaluation"
        );

        let mut outcomes: Vec<CellOutcome> = stream::iter(cells.into_iter().map(|(qi, si)| {
            let query = &queries[qi];
            let strategy = strategies[si];
            async move { self.run_cell(qi, si, query, strategy, cancel).await }
        }))
        .buffer_unordered(self.settings.concurrency.max(1))
        .collect()
        .await;

        outcomes.sort_by_key(|o| (o.query_index, o.strategy_index));

        let timings = strategies
            .iter()
            .enumerate()
            .map(|(si, &strategy)| {
                let latencies: Vec<f64> = outcomes
                    .iter()
                    .filter(|o| o.strategy_index == si)
                    .filter_map(|o| o.latency)
                    .map(|d| d.as_secs_f64() * 1000.0)
                    .collect();
                StrategyTiming {
                    strategy,
                    mean_latency_ms: mean(&latencies),
                }
            })
            .collect();

        let runs: Vec<StrategyRun> = outcomes.into_iter().map(|o| o.run).collect();
        let report = EvaluationReport::build(
            self.settings.k,
            strategies,
            runs,
            timings,
            self.settings.weights,
        );

        info!(
            best = ?report.best.final_score,
            failed = report.failed_runs().count(),
            cancelled = report.cancelled,
            "evaluation finished"
        );
        report
    }

    async fn run_cell(
        &self,
        query_index: usize,
        strategy_index: usize,
        query: &Query,
        strategy: StrategyKind,
        cancel: &Cancellation,
    ) -> CellOutcome {
        let mut run = StrategyRun {
            query_index,
            query: query.text.clone(),
            strategy,
            status: CellStatus::Cancelled,
            results: Vec::new(),
            excluded: 0,
            metrics: None,
        };

        if cancel.is_cancelled() {
            debug!(query = %query.text, %strategy, "cell cancelled before start");
            return CellOutcome {
                query_index,
                strategy_index,
                run,
                latency: None,
            };
        }

        let started = Instant::now();
        let k = self.settings.k;
        let result = match timeout(
            self.settings.cell_timeout,
            self.service.run_strategy(strategy, query, k),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RankError::Timeout {
                operation: format!("{} run for '{}'", strategy, query.text),
                secs: self.settings.cell_timeout.as_secs(),
            }),
        };
        let latency = started.elapsed();

        match result {
            Ok(outcome) => {
                let mut results = outcome.results;
                let grades = self.judge.judge(&mut results, query.blood_type);
                run.metrics = Some(self.score_run(&results, &grades, query.blood_type));
                run.excluded = outcome.exclusions.len();
                run.results = results;
                run.status = CellStatus::Completed;
                debug!(
                    query = %query.text,
                    %strategy,
                    results = run.results.len(),
                    ?grades,
                    "cell completed"
                );
            }
            Err(e) => {
                warn!(query = %query.text, %strategy, error = %e, "cell failed");
                run.status = CellStatus::Failed {
                    error: e.to_string(),
                };
            }
        }

        CellOutcome {
            query_index,
            strategy_index,
            run,
            latency: Some(latency),
        }
    }

    fn score_run(&self, results: &[RankedResult], grades: &[u8], blood_type: BloodType) -> RunMetrics {
        let k = self.settings.k;
        let top = &grades[..grades.len().min(k)];
        let distances: Vec<f64> = results.iter().map(|r| r.distance_km).collect();
        RunMetrics {
            reciprocal_rank: reciprocal_rank(grades),
            ndcg: ndcg_at_k(top),
            precision: precision_at_k(results, k, |r| is_operationally_relevant(r, blood_type)),
            avg_distance_km: (!distances.is_empty()).then(|| mean(&distances)),
        }
    }
}
