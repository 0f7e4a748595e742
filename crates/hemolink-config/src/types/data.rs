//! Data source configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the hospital snapshot is read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON export of enriched hospital records
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl crate::validation::Validate for DataConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        if self.snapshot_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "data.snapshot_path".to_string(),
                message: "Snapshot path cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/processed_hospitals.json")
}
