//! Validation trait and helpers for configuration types

use crate::error::{ConfigError, Result};

/// Trait for validating configuration values
///
/// Implement this trait for any config type that needs validation beyond
/// type-level checks.
pub trait Validate {
    /// Returns `Ok(())` if validation passes, or a `ConfigError` describing
    /// what failed and why.
    fn validate(&self) -> Result<()>;
}

/// Checks that a collection of weights sums to `expected` (within 1%).
pub fn validate_weight_sum(
    field: impl Into<String>,
    weights: &[(&str, f64)],
    expected: f64,
) -> Result<()> {
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    let epsilon = 0.01;

    if (sum - expected).abs() > epsilon {
        return Err(ConfigError::InvalidWeightSum {
            field: field.into(),
            expected,
            actual: sum,
            hint: format!(
                "Adjust the following weights: {}",
                weights
                    .iter()
                    .map(|(name, val)| format!("{} = {:.2}", name, val))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        });
    }

    Ok(())
}

/// Helper function to validate value is within range
pub fn validate_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Helper function to validate integer is above minimum
pub fn validate_positive(field: impl Into<String>, value: usize, min: usize) -> Result<()> {
    if value <= min {
        return Err(ConfigError::InvalidInteger {
            field: field.into(),
            value,
            min,
        });
    }
    Ok(())
}
