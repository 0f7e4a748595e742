//! Configuration type definitions
//!
//! This module contains all configuration structures organized by concern.
//! Each type is self-contained with validation and sensible defaults.

pub mod data;
pub mod embedding;
pub mod evaluation;
pub mod ranking;
pub mod relevance;

// Re-export all types for convenience
pub use data::DataConfig;
pub use embedding::{EmbeddingBackend, EmbeddingConfig};
pub use evaluation::{EvaluationConfig, StrategyKind};
pub use ranking::RankingConfig;
pub use relevance::RelevanceConfig;

use serde::{Deserialize, Serialize};

/// Main configuration struct aggregating all settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Hospital snapshot location
    #[serde(default)]
    pub data: DataConfig,

    /// Composite score weights for live ranking
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Relevance rubric thresholds used by the evaluation path
    #[serde(default)]
    pub relevance: RelevanceConfig,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Evaluation harness settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

impl crate::validation::Validate for Config {
    fn validate(&self) -> crate::error::Result<()> {
        self.data.validate()?;
        self.ranking.validate()?;
        self.relevance.validate()?;
        self.embedding.validate()?;
        self.evaluation.validate()?;

        Ok(())
    }
}
