//! Evaluation harness configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named retrieval policy compared by the evaluation harness
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Hard blood-type filter, ordered by average response time (ascending)
    FilterOnly,
    /// Hard blood-type filter, ordered by rating (descending)
    FilterByRating,
    /// No filter, ordered purely by embedding distance
    SimilarityOnly,
    /// City and blood-type filter, ordered by the composite score
    Hybrid,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::FilterOnly,
        StrategyKind::FilterByRating,
        StrategyKind::SimilarityOnly,
        StrategyKind::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::FilterOnly => "filter-only",
            StrategyKind::FilterByRating => "filter-by-rating",
            StrategyKind::SimilarityOnly => "similarity-only",
            StrategyKind::Hybrid => "hybrid",
        }
    }

    /// Whether the strategy needs a query embedding
    pub fn uses_embedding(&self) -> bool {
        matches!(self, StrategyKind::SimilarityOnly | StrategyKind::Hybrid)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| {
                let options: Vec<&str> = StrategyKind::ALL.iter().map(|k| k.as_str()).collect();
                crate::error::ConfigError::invalid_enum("evaluation.strategies", s, &options)
            })
    }
}

/// Evaluation harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Held-out emergency queries
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,

    /// City used by strategies that filter by city
    #[serde(default = "default_city")]
    pub city: String,

    /// Requester latitude in degrees
    #[serde(default = "default_user_lat")]
    pub user_lat: f64,

    /// Requester longitude in degrees
    #[serde(default = "default_user_lon")]
    pub user_lon: f64,

    /// Requested blood type code (e.g. "O+")
    #[serde(default = "default_blood_type")]
    pub blood_type: String,

    /// Cut-off K for NDCG@K and Precision@K, and results per run
    #[serde(default = "default_k")]
    pub k: usize,

    /// Strategies to compare, in report order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,

    /// Maximum number of query×strategy cells in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Upper bound on a single candidate fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Weight of MRR in the composite strategy score
    #[serde(default = "default_mrr_weight")]
    pub mrr_weight: f64,

    /// Weight of NDCG@K in the composite strategy score
    #[serde(default = "default_ndcg_weight")]
    pub ndcg_weight: f64,

    /// Weight of normalized distance in the composite strategy score
    #[serde(default = "default_distance_weight")]
    pub distance_weight: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            queries: default_queries(),
            city: default_city(),
            user_lat: default_user_lat(),
            user_lon: default_user_lon(),
            blood_type: default_blood_type(),
            k: default_k(),
            strategies: default_strategies(),
            concurrency: default_concurrency(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            mrr_weight: default_mrr_weight(),
            ndcg_weight: default_ndcg_weight(),
            distance_weight: default_distance_weight(),
        }
    }
}

impl crate::validation::Validate for EvaluationConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::{validate_positive, validate_range, validate_weight_sum};

        if self.queries.is_empty() || self.queries.iter().any(|q| q.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                field: "evaluation.queries".to_string(),
                message: "Query set must be non-empty and contain no blank queries".to_string(),
            });
        }

        if self.strategies.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "evaluation.strategies".to_string(),
                message: "At least one strategy is required".to_string(),
            });
        }

        if self.blood_type.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "evaluation.blood_type".to_string(),
                message: "Blood type cannot be empty".to_string(),
            });
        }

        validate_range("evaluation.user_lat", self.user_lat, -90.0, 90.0)?;
        validate_range("evaluation.user_lon", self.user_lon, -180.0, 180.0)?;

        validate_positive("evaluation.k", self.k, 0)?;
        if self.k > 1000 {
            return Err(ConfigError::ValidationError {
                field: "evaluation.k".to_string(),
                message: format!("k too large ({}), consider using <= 1000", self.k),
            });
        }
        validate_positive("evaluation.concurrency", self.concurrency, 0)?;
        validate_positive(
            "evaluation.fetch_timeout_secs",
            self.fetch_timeout_secs as usize,
            0,
        )?;

        validate_range("evaluation.mrr_weight", self.mrr_weight, 0.0, 1.0)?;
        validate_range("evaluation.ndcg_weight", self.ndcg_weight, 0.0, 1.0)?;
        validate_range("evaluation.distance_weight", self.distance_weight, 0.0, 1.0)?;
        let weights = [
            ("mrr_weight", self.mrr_weight),
            ("ndcg_weight", self.ndcg_weight),
            ("distance_weight", self.distance_weight),
        ];
        validate_weight_sum("evaluation", &weights, 1.0)?;

        Ok(())
    }
}

fn default_queries() -> Vec<String> {
    [
        "road accident O+ blood",
        "heart attack ICU nearby",
        "child emergency blood needed",
        "major trauma case",
        "severe bleeding patient",
        "ambulance emergency",
        "stroke emergency",
        "critical surgery blood",
        "accident victim ICU",
        "urgent blood transfusion",
    ]
    .iter()
    .map(|q| q.to_string())
    .collect()
}

fn default_city() -> String {
    "Delhi".to_string()
}

fn default_user_lat() -> f64 {
    28.6139
}

fn default_user_lon() -> f64 {
    77.2090
}

fn default_blood_type() -> String {
    "O+".to_string()
}

fn default_k() -> usize {
    5
}

fn default_strategies() -> Vec<StrategyKind> {
    vec![
        StrategyKind::FilterOnly,
        StrategyKind::SimilarityOnly,
        StrategyKind::Hybrid,
    ]
}

fn default_concurrency() -> usize {
    4
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_mrr_weight() -> f64 {
    0.4
}

fn default_ndcg_weight() -> f64 {
    0.4
}

fn default_distance_weight() -> f64 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_default_is_valid() {
        let config = EvaluationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queries.len(), 10);
        assert_eq!(config.strategies.len(), 3);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "hybrid".parse::<StrategyKind>().unwrap(),
            StrategyKind::Hybrid
        );
        assert_eq!(
            " Filter-By-Rating ".parse::<StrategyKind>().unwrap(),
            StrategyKind::FilterByRating
        );
        assert!("vector".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_strategy_serde_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&StrategyKind::SimilarityOnly).unwrap(),
            "\"similarity-only\""
        );
        let kind: StrategyKind = serde_json::from_str("\"filter-only\"").unwrap();
        assert_eq!(kind, StrategyKind::FilterOnly);
    }

    #[test]
    fn test_k_bounds() {
        let too_large = EvaluationConfig {
            k: 1001,
            ..Default::default()
        };
        assert!(too_large.validate().is_err());

        let zero = EvaluationConfig {
            k: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let upper = EvaluationConfig {
            k: 1000,
            ..Default::default()
        };
        assert!(upper.validate().is_ok());
    }

    #[test]
    fn test_empty_queries_invalid() {
        let config = EvaluationConfig {
            queries: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_composite_weights_invalid() {
        let config = EvaluationConfig {
            distance_weight: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_requester_invalid() {
        let config = EvaluationConfig {
            user_lat: 91.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
