//! Embedding provider configuration

use serde::{Deserialize, Serialize};

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding backend to use
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Model name for the selected backend
    ///
    /// Examples:
    /// - OpenAI: "text-embedding-3-small"
    /// - Ollama: "nomic-embed-text", "mxbai-embed-large"
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Override for the provider base URL
    ///
    /// Defaults to `http://localhost:11434` for Ollama and
    /// `https://api.openai.com` for OpenAI.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Upper bound on a single embedding request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Embedding backend options
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// OpenAI API (requires OPENAI_API_KEY)
    #[serde(rename = "openai")]
    External,

    /// Local Ollama server
    #[default]
    Ollama,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Ollama,
            model_name: default_model_name(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl crate::validation::Validate for EmbeddingConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::validate_positive;

        if self.model_name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "embedding.model_name".to_string(),
                message: "Model name cannot be empty".to_string(),
            });
        }

        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError {
                    field: "embedding.base_url".to_string(),
                    message: format!("Expected an http(s) URL, got '{}'", url),
                });
            }
        }

        validate_positive("embedding.timeout_secs", self.timeout_secs as usize, 0)?;

        Ok(())
    }
}

fn default_model_name() -> String {
    "nomic-embed-text".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_default_is_valid() {
        let config = EmbeddingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_empty_model_name_invalid() {
        let config = EmbeddingConfig {
            model_name: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let config = EmbeddingConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_base_url_invalid() {
        let config = EmbeddingConfig {
            base_url: Some("localhost:11434".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_serialization() {
        assert_eq!(
            serde_json::to_string(&EmbeddingBackend::External).unwrap(),
            "\"openai\""
        );
        assert_eq!(
            serde_json::to_string(&EmbeddingBackend::Ollama).unwrap(),
            "\"ollama\""
        );
    }
}
