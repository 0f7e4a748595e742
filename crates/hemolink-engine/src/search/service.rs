use hemolink_config::{Config, StrategyKind};
use hemolink_core::traits::{CandidateStore, Embedder, FetchRequest};
use hemolink_core::{HospitalCandidate, Query, RankError, RankOutcome, ScoringEngine};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Result of a live ranking call.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub outcome: RankOutcome,
    /// Set when the embedding term was dropped because the provider failed.
    pub degraded: bool,
}

/// Live ranking path: embed the query, fetch the scoring pool, rank.
pub struct RecommendService {
    store: Arc<dyn CandidateStore>,
    embedder: Option<Arc<dyn Embedder + Send + Sync>>,
    engine: ScoringEngine,
    embed_timeout: Duration,
    fetch_timeout: Duration,
}

impl RecommendService {
    pub fn new(
        store: Arc<dyn CandidateStore>,
        embedder: Option<Arc<dyn Embedder + Send + Sync>>,
        engine: ScoringEngine,
    ) -> Self {
        Self {
            store,
            embedder,
            engine,
            embed_timeout: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(
        store: Arc<dyn CandidateStore>,
        embedder: Option<Arc<dyn Embedder + Send + Sync>>,
        config: &Config,
    ) -> Self {
        Self::new(store, embedder, ScoringEngine::from_config(&config.ranking)).with_timeouts(
            Duration::from_secs(config.embedding.timeout_secs),
            Duration::from_secs(config.evaluation.fetch_timeout_secs),
        )
    }

    pub fn with_timeouts(mut self, embed_timeout: Duration, fetch_timeout: Duration) -> Self {
        self.embed_timeout = embed_timeout;
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Upper bound on one embed plus one fetch.
    pub fn call_budget(&self) -> Duration {
        self.embed_timeout + self.fetch_timeout
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RankError> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| RankError::EmbeddingUnavailable {
                reason: "no embedding provider configured".to_string(),
            })?;

        match timeout(self.embed_timeout, embedder.embed(text)).await {
            Ok(Ok(vector)) => Ok(vector),
            Ok(Err(e)) => Err(RankError::EmbeddingUnavailable {
                reason: format!("{:#}", e),
            }),
            Err(_) => Err(RankError::EmbeddingUnavailable {
                reason: format!("timed out after {:?}", self.embed_timeout),
            }),
        }
    }

    pub async fn fetch(&self, request: &FetchRequest) -> Result<Vec<HospitalCandidate>, RankError> {
        match timeout(self.fetch_timeout, self.store.fetch(request)).await {
            Ok(Ok(candidates)) => Ok(candidates),
            Ok(Err(e)) => Err(RankError::Store(format!("{:#}", e))),
            Err(_) => Err(RankError::Timeout {
                operation: "candidate fetch".to_string(),
                secs: self.fetch_timeout.as_secs(),
            }),
        }
    }

    /// Ranks the city and stock filtered pool for `query`.
    ///
    /// If the embedding call fails and `allow_degraded` is set, ranking
    /// continues without the similarity term; otherwise the call fails with
    /// `EmbeddingUnavailable`.
    pub async fn recommend(
        &self,
        query: &Query,
        top_k: usize,
        allow_degraded: bool,
    ) -> Result<Recommendation, RankError> {
        query.location()?;

        let (vector, degraded) = match self.embed_query(&query.text).await {
            Ok(vector) => (Some(vector), false),
            Err(e) if allow_degraded => {
                warn!(query = %query.text, error = %e, "ranking without similarity signal");
                (None, true)
            }
            Err(e) => return Err(e),
        };

        let request = FetchRequest::scoring_pool(query, vector);
        let candidates = self.fetch(&request).await?;
        debug!(query = %query.text, candidates = candidates.len(), "fetched scoring pool");

        let outcome = self.score_pool(&request, query, &candidates, top_k)?;
        Ok(Recommendation { outcome, degraded })
    }

    /// One evaluation run of `kind` for `query`, cut to `k` results.
    pub async fn run_strategy(
        &self,
        kind: StrategyKind,
        query: &Query,
        k: usize,
    ) -> Result<RankOutcome, RankError> {
        let vector = if kind.uses_embedding() {
            Some(self.embed_query(&query.text).await?)
        } else {
            None
        };

        let request = FetchRequest::for_strategy(kind, query, vector, k);
        let candidates = self.fetch(&request).await?;
        match kind {
            StrategyKind::Hybrid => self.score_pool(&request, query, &candidates, k),
            StrategyKind::FilterOnly | StrategyKind::FilterByRating | StrategyKind::SimilarityOnly => {
                self.engine.annotate(query, &candidates, k)
            }
        }
    }

    /// A pool fetched against a query vector must carry a distance for
    /// every scored candidate.
    fn score_pool(
        &self,
        request: &FetchRequest,
        query: &Query,
        candidates: &[HospitalCandidate],
        top_k: usize,
    ) -> Result<RankOutcome, RankError> {
        if request.query_vector.is_some() {
            self.engine.rank_with_similarity(query, candidates, top_k)
        } else {
            self.engine.rank(query, candidates, top_k)
        }
    }
}
