//! Ranking weights configuration

use serde::{Deserialize, Serialize};

/// Weights of the composite hospital score
///
/// The composite score is a weighted sum where lower is better:
/// `vector * vector_distance + distance * km + response * (mins / 60) + rating * (1 / rating)`.
/// All weights must be in [0, 1] and sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Weight for the query/hospital embedding distance
    #[serde(default = "default_vector")]
    pub vector: f64,

    /// Weight for the great-circle distance to the requester, in km
    #[serde(default = "default_distance")]
    pub distance: f64,

    /// Weight for the average response time, in hours
    #[serde(default = "default_response")]
    pub response: f64,

    /// Weight for the inverse hospital rating
    #[serde(default = "default_rating")]
    pub rating: f64,

    /// Number of recommendations returned by the live path
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Rank without the vector term when the embedding provider is down.
    ///
    /// Off by default: an unavailable provider fails the request.
    #[serde(default)]
    pub allow_degraded: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            vector: default_vector(),
            distance: default_distance(),
            response: default_response(),
            rating: default_rating(),
            top_k: default_top_k(),
            allow_degraded: false,
        }
    }
}

impl crate::validation::Validate for RankingConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::{validate_positive, validate_range, validate_weight_sum};

        validate_range("ranking.vector", self.vector, 0.0, 1.0)?;
        validate_range("ranking.distance", self.distance, 0.0, 1.0)?;
        validate_range("ranking.response", self.response, 0.0, 1.0)?;
        validate_range("ranking.rating", self.rating, 0.0, 1.0)?;

        let weights = [
            ("vector", self.vector),
            ("distance", self.distance),
            ("response", self.response),
            ("rating", self.rating),
        ];
        validate_weight_sum("ranking", &weights, 1.0)?;

        validate_positive("ranking.top_k", self.top_k, 0)?;
        if self.top_k > 1000 {
            return Err(ConfigError::ValidationError {
                field: "ranking.top_k".to_string(),
                message: format!("top_k too large ({}), consider using <= 1000", self.top_k),
            });
        }

        Ok(())
    }
}

// Hand-tuned weights: semantic match dominates, then proximity, with
// response time and rating as tie-breaking operational signals.

fn default_vector() -> f64 {
    0.5
}

fn default_distance() -> f64 {
    0.3
}

fn default_response() -> f64 {
    0.1
}

fn default_rating() -> f64 {
    0.1
}

fn default_top_k() -> usize {
    5
}
