//! Configuration management for hemolink
//!
//! This crate provides a validated configuration system with support for:
//! - Multiple formats (YAML, TOML, JSON)
//! - Config validation with helpful error messages
//! - Config merging (file + environment + explicit overrides)
//! - Type-safe configuration structs
//!
//! # Example
//!
//! ```no_run
//! use hemolink_config::Config;
//!
//! // Load from default location (.hemolink.{toml,yml,json})
//! let config = Config::load()?;
//!
//! // Or load from specific file
//! let config = Config::from_file("path/to/config.toml")?;
//!
//! let top_k = config.ranking.top_k;
//! let strategies = &config.evaluation.strategies;
//! # Ok::<(), hemolink_config::ConfigError>(())
//! ```

pub mod error;
pub mod loader;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use error::{ConfigError, Result};
pub use loader::ConfigBuilder;
pub use types::*;

/// Trait for config validation
pub use validation::Validate;
