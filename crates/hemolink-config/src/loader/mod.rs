//! Configuration loading from various sources

pub mod env;
pub mod file;
pub mod formats;
pub mod merge;

use crate::{Config, Result, Validate};
use std::path::{Path, PathBuf};

/// Format for configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

/// Configuration source for layered loading
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Load from a file
    File(PathBuf),
    /// Load from environment variables
    Environment,
    /// Explicit config object (for programmatic use)
    Explicit(Config),
}

/// Builder for loading and merging configurations
///
/// Supports layered configuration with proper precedence:
/// defaults < file < environment < explicit overrides
///
/// # Example
///
/// ```no_run
/// use hemolink_config::loader::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .with_file(".hemolink.toml")
///     .with_env()
///     .build()?;
/// # Ok::<(), hemolink_config::error::ConfigError>(())
/// ```
pub struct ConfigBuilder {
    sources: Vec<ConfigSource>,
}

impl ConfigBuilder {
    /// Create a new config builder starting with defaults
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources
            .push(ConfigSource::File(path.as_ref().to_path_buf()));
        self
    }

    /// Add environment variable overlay
    pub fn with_env(mut self) -> Self {
        self.sources.push(ConfigSource::Environment);
        self
    }

    /// Add explicit config overlay (for programmatic use)
    pub fn with_config(mut self, config: Config) -> Self {
        self.sources.push(ConfigSource::Explicit(config));
        self
    }

    /// Build and validate the final configuration
    ///
    /// Merges all sources in order, with later sources taking precedence.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        for source in self.sources {
            match source {
                ConfigSource::File(path) => {
                    let file_config = file::load_from_file(&path)?;
                    config = merge::merge(config, file_config);
                }
                ConfigSource::Environment => {
                    if let Some(env_config) = env::from_env()? {
                        config = merge::merge(config, env_config);
                    }
                }
                ConfigSource::Explicit(explicit_config) => {
                    config = merge::merge(config, explicit_config);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a single file (convenience method)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        Self::new().with_file(path).build()
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Default file names, searched in order in the working directory
pub const DEFAULT_CONFIG_FILES: [&str; 4] = [
    ".hemolink.toml",
    ".hemolink.yml",
    ".hemolink.yaml",
    ".hemolink.json",
];

impl Config {
    /// Load configuration from default locations
    ///
    /// Uses the first of [`DEFAULT_CONFIG_FILES`] that exists, falling back
    /// to defaults, then applies environment variable overlays.
    pub fn load() -> Result<Self> {
        let mut builder = ConfigBuilder::new();

        if let Some(path) = DEFAULT_CONFIG_FILES
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.with_file(path);
        }

        builder.with_env().build()
    }

    /// Load configuration from a specific file
    ///
    /// Also applies environment variable overlays.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        ConfigBuilder::new().with_file(path).with_env().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrategyKind;
    use std::io::Write;

    #[test]
    fn test_builder_default() {
        let config = ConfigBuilder::new().build().unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_file_then_explicit() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[ranking]\ntop_k = 3\n\n[evaluation]\ncity = \"Pune\"").unwrap();

        let mut explicit = Config::default();
        explicit.evaluation.strategies = vec![StrategyKind::Hybrid];

        let config = ConfigBuilder::new()
            .with_file(file.path())
            .with_config(explicit)
            .build()
            .unwrap();

        assert_eq!(config.ranking.top_k, 3);
        assert_eq!(config.evaluation.city, "Pune");
        assert_eq!(config.evaluation.strategies, vec![StrategyKind::Hybrid]);
    }

    #[test]
    fn test_builder_rejects_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"ranking": {{"vector": 0.9}}}}"#).unwrap();

        let err = ConfigBuilder::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::ConfigError::InvalidWeightSum { .. }));
    }
}
