//! YAML format parser

use crate::{error::ConfigError, Config, Result};

/// Parse configuration from YAML string
pub fn parse(content: &str) -> Result<Config> {
    parse_with_path(content, None)
}

/// Parse configuration from YAML string with file path for better errors
pub fn parse_with_path(content: &str, path: Option<&str>) -> Result<Config> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::from_yaml_error(e, content, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrategyKind;

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
ranking:
  top_k: 3
evaluation:
  strategies: [hybrid, similarity-only]
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.ranking.top_k, 3);
        assert_eq!(
            config.evaluation.strategies,
            vec![StrategyKind::Hybrid, StrategyKind::SimilarityOnly]
        );
    }

    #[test]
    fn test_parse_empty_yaml() {
        let config = parse("{}").unwrap();
        assert_eq!(config.ranking.top_k, 5);
        assert_eq!(config.evaluation.k, 5);
    }

    #[test]
    fn test_parse_invalid_strategy_fails() {
        let yaml = r#"
evaluation:
  strategies: [keyword]
"#;
        assert!(matches!(parse(yaml), Err(ConfigError::YamlError { .. })));
    }
}
