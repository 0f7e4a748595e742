pub mod error;
pub mod geo;
pub mod metrics;
pub mod models;
pub mod ranking;
pub mod relevance;
pub mod traits;

pub use error::RankError;
pub use geo::{distance_km, GeoPoint};
pub use models::{BloodType, HospitalCandidate, Query, RankedResult};
pub use ranking::{Exclusion, ExclusionReason, RankOutcome, ScoreWeights, ScoringEngine};
pub use relevance::RelevanceJudge;
pub use traits::{CandidateFilter, CandidateOrder, CandidateStore, Embedder, FetchRequest};
