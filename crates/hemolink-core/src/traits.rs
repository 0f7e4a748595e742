use crate::models::{BloodType, HospitalCandidate, Query};
use anyhow::Result;
use async_trait::async_trait;
use hemolink_config::StrategyKind;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<HospitalCandidate>>;
}

/// Predicate applied by the store. Empty fields mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    pub city: Option<String>,
    /// Keep only rows with stock of this type.
    pub blood_type: Option<BloodType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrder {
    ResponseTimeAsc,
    RatingDesc,
    VectorDistance,
    /// Store order; the caller ranks.
    Unordered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub filter: CandidateFilter,
    pub order: CandidateOrder,
    /// When set, the store fills `vector_distance` on every returned row.
    pub query_vector: Option<Vec<f32>>,
    pub limit: Option<usize>,
}

impl FetchRequest {
    /// Builds the store request behind a named strategy.
    ///
    /// Baselines search globally with a stock filter, similarity search has
    /// no filter at all, and the hybrid strategy fetches the full
    /// city-scoped pool so the scoring engine can pick the top `k`.
    pub fn for_strategy(
        kind: StrategyKind,
        query: &Query,
        query_vector: Option<Vec<f32>>,
        k: usize,
    ) -> Self {
        match kind {
            StrategyKind::FilterOnly => Self {
                filter: CandidateFilter {
                    city: None,
                    blood_type: Some(query.blood_type),
                },
                order: CandidateOrder::ResponseTimeAsc,
                query_vector: None,
                limit: Some(k),
            },
            StrategyKind::FilterByRating => Self {
                filter: CandidateFilter {
                    city: None,
                    blood_type: Some(query.blood_type),
                },
                order: CandidateOrder::RatingDesc,
                query_vector: None,
                limit: Some(k),
            },
            StrategyKind::SimilarityOnly => Self {
                filter: CandidateFilter::default(),
                order: CandidateOrder::VectorDistance,
                query_vector,
                limit: Some(k),
            },
            StrategyKind::Hybrid => Self::scoring_pool(query, query_vector),
        }
    }

    /// City and stock filtered candidates for composite scoring.
    pub fn scoring_pool(query: &Query, query_vector: Option<Vec<f32>>) -> Self {
        Self {
            filter: CandidateFilter {
                city: query.city.clone(),
                blood_type: Some(query.blood_type),
            },
            order: CandidateOrder::Unordered,
            query_vector,
            limit: None,
        }
    }
}
