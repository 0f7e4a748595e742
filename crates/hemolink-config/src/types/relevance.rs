//! Relevance rubric thresholds

use serde::{Deserialize, Serialize};

/// Band boundaries of the graded relevance rubric
///
/// Only the thresholds are configurable; the points awarded per band are
/// fixed so that the maximum grade stays at 7.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceConfig {
    /// Hospitals closer than this (km) earn the full distance points
    #[serde(default = "default_near_km")]
    pub near_km: f64,

    /// Hospitals closer than this (km) earn the partial distance point
    #[serde(default = "default_mid_km")]
    pub mid_km: f64,

    /// Units of the requested blood type that earn the full inventory points
    #[serde(default = "default_blood_units_high")]
    pub blood_units_high: u32,

    /// ICU beds that earn the full ICU points
    #[serde(default = "default_icu_beds_high")]
    pub icu_beds_high: u32,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            near_km: default_near_km(),
            mid_km: default_mid_km(),
            blood_units_high: default_blood_units_high(),
            icu_beds_high: default_icu_beds_high(),
        }
    }
}

impl crate::validation::Validate for RelevanceConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::validate_positive;

        if !self.near_km.is_finite() || self.near_km <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: "relevance.near_km".to_string(),
                message: format!("must be a positive distance, got {}", self.near_km),
            });
        }
        if !self.mid_km.is_finite() || self.mid_km <= self.near_km {
            return Err(ConfigError::ValidationError {
                field: "relevance.mid_km".to_string(),
                message: format!(
                    "must be greater than relevance.near_km ({}), got {}",
                    self.near_km, self.mid_km
                ),
            });
        }
        validate_positive(
            "relevance.blood_units_high",
            self.blood_units_high as usize,
            1,
        )?;
        validate_positive("relevance.icu_beds_high", self.icu_beds_high as usize, 1)?;

        Ok(())
    }
}

fn default_near_km() -> f64 {
    5.0
}

fn default_mid_km() -> f64 {
    15.0
}

fn default_blood_units_high() -> u32 {
    10
}

fn default_icu_beds_high() -> u32 {
    5
}
