//! Environment variable configuration overlay
//!
//! Supports environment variables in the format:
//! `HEMOLINK_<section>_<field>=value`
//!
//! Examples:
//! - `HEMOLINK_RANKING_TOP_K=3`
//! - `HEMOLINK_EMBEDDING_TIMEOUT_SECS=10`
//! - `HEMOLINK_EVALUATION_STRATEGIES=filter-only,hybrid`
//! - `HEMOLINK_EVALUATION_QUERIES="stroke emergency;major trauma case"`

use crate::{error::ConfigError, types::*, Config, Result};
use std::env;
use std::path::PathBuf;

const PREFIX: &str = "HEMOLINK_";

/// Parse configuration from environment variables
pub fn from_env() -> Result<Option<Config>> {
    let env_vars: Vec<(String, String)> =
        env::vars().filter(|(k, _)| k.starts_with(PREFIX)).collect();

    if env_vars.is_empty() {
        return Ok(None);
    }

    let mut config = Config::default();
    for (key, value) in env_vars {
        if let Err(e) = apply_env_var(&mut config, &key, &value) {
            eprintln!("Warning: failed to parse {}: {}", key, e);
        }
    }

    Ok(Some(config))
}

/// Apply a single environment variable to config
fn apply_env_var(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let key = key.strip_prefix(PREFIX).unwrap_or(key);

    let (section, field) = match key.split_once('_') {
        Some((section, field)) if !field.is_empty() => (section.to_lowercase(), field.to_lowercase()),
        _ => {
            return Err(ConfigError::EnvVarError {
                var: key.to_string(),
                message: "Expected format: HEMOLINK_<section>_<field>".to_string(),
            })
        }
    };

    match section.as_str() {
        "data" => apply_data_var(&mut config.data, &field, value),
        "ranking" => apply_ranking_var(&mut config.ranking, &field, value),
        "relevance" => apply_relevance_var(&mut config.relevance, &field, value),
        "embedding" => apply_embedding_var(&mut config.embedding, &field, value),
        "evaluation" => apply_evaluation_var(&mut config.evaluation, &field, value),
        _ => Err(ConfigError::EnvVarError {
            var: key.to_string(),
            message: format!("Unknown section: {}", section),
        }),
    }
}

fn var_name(section: &str, field: &str) -> String {
    format!("{}{}_{}", PREFIX, section.to_uppercase(), field.to_uppercase())
}

fn parse_number<T: std::str::FromStr>(section: &str, field: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| ConfigError::EnvVarError {
        var: var_name(section, field),
        message: format!("Invalid number: {}", value),
    })
}

fn unknown_field(section: &str, field: &str) -> ConfigError {
    ConfigError::EnvVarError {
        var: var_name(section, field),
        message: format!("Unknown field: {}", field),
    }
}

fn apply_data_var(config: &mut DataConfig, field: &str, value: &str) -> Result<()> {
    match field {
        "snapshot_path" => config.snapshot_path = PathBuf::from(value),
        _ => return Err(unknown_field("data", field)),
    }
    Ok(())
}

fn apply_ranking_var(config: &mut RankingConfig, field: &str, value: &str) -> Result<()> {
    match field {
        "vector" => config.vector = parse_number("ranking", field, value)?,
        "distance" => config.distance = parse_number("ranking", field, value)?,
        "response" => config.response = parse_number("ranking", field, value)?,
        "rating" => config.rating = parse_number("ranking", field, value)?,
        "top_k" => config.top_k = parse_number("ranking", field, value)?,
        "allow_degraded" => config.allow_degraded = parse_bool(value)?,
        _ => return Err(unknown_field("ranking", field)),
    }
    Ok(())
}

fn apply_relevance_var(config: &mut RelevanceConfig, field: &str, value: &str) -> Result<()> {
    match field {
        "near_km" => config.near_km = parse_number("relevance", field, value)?,
        "mid_km" => config.mid_km = parse_number("relevance", field, value)?,
        "blood_units_high" => config.blood_units_high = parse_number("relevance", field, value)?,
        "icu_beds_high" => config.icu_beds_high = parse_number("relevance", field, value)?,
        _ => return Err(unknown_field("relevance", field)),
    }
    Ok(())
}

fn apply_embedding_var(config: &mut EmbeddingConfig, field: &str, value: &str) -> Result<()> {
    match field {
        "backend" => {
            config.backend = match value.to_lowercase().as_str() {
                "openai" | "external" => EmbeddingBackend::External,
                "ollama" => EmbeddingBackend::Ollama,
                _ => {
                    return Err(ConfigError::invalid_enum(
                        "embedding.backend",
                        value,
                        &["openai", "ollama"],
                    ))
                }
            };
        }
        "model_name" => config.model_name = value.to_string(),
        "base_url" => config.base_url = Some(value.to_string()),
        "timeout_secs" => config.timeout_secs = parse_number("embedding", field, value)?,
        _ => return Err(unknown_field("embedding", field)),
    }
    Ok(())
}

fn apply_evaluation_var(config: &mut EvaluationConfig, field: &str, value: &str) -> Result<()> {
    match field {
        "queries" => {
            config.queries = value
                .split(';')
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .collect();
        }
        "strategies" => {
            config.strategies = value
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse::<StrategyKind>)
                .collect::<Result<Vec<_>>>()?;
        }
        "city" => config.city = value.to_string(),
        "user_lat" => config.user_lat = parse_number("evaluation", field, value)?,
        "user_lon" => config.user_lon = parse_number("evaluation", field, value)?,
        "blood_type" => config.blood_type = value.to_string(),
        "k" => config.k = parse_number("evaluation", field, value)?,
        "concurrency" => config.concurrency = parse_number("evaluation", field, value)?,
        "fetch_timeout_secs" => {
            config.fetch_timeout_secs = parse_number("evaluation", field, value)?
        }
        "mrr_weight" => config.mrr_weight = parse_number("evaluation", field, value)?,
        "ndcg_weight" => config.ndcg_weight = parse_number("evaluation", field, value)?,
        "distance_weight" => config.distance_weight = parse_number("evaluation", field, value)?,
        _ => return Err(unknown_field("evaluation", field)),
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::EnvVarError {
            var: value.to_string(),
            message: format!(
                "Invalid boolean: {} (use true/false, 1/0, yes/no, on/off)",
                value
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that touch the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn cleanup_hemolink_env_vars() {
        let keys: Vec<String> = env::vars()
            .filter(|(k, _)| k.starts_with(PREFIX))
            .map(|(k, _)| k)
            .collect();
        for key in keys {
            env::remove_var(&key);
        }
    }

    #[test]
    fn test_ranking_top_k_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        cleanup_hemolink_env_vars();
        env::set_var("HEMOLINK_RANKING_TOP_K", "3");
        env::set_var("HEMOLINK_RANKING_ALLOW_DEGRADED", "yes");
        let config = from_env().unwrap().unwrap();
        assert_eq!(config.ranking.top_k, 3);
        assert!(config.ranking.allow_degraded);
        cleanup_hemolink_env_vars();
    }

    #[test]
    fn test_evaluation_lists_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        cleanup_hemolink_env_vars();
        env::set_var("HEMOLINK_EVALUATION_STRATEGIES", "filter-by-rating, hybrid");
        env::set_var(
            "HEMOLINK_EVALUATION_QUERIES",
            "stroke emergency; ;major trauma case",
        );
        let config = from_env().unwrap().unwrap();
        assert_eq!(
            config.evaluation.strategies,
            vec![StrategyKind::FilterByRating, StrategyKind::Hybrid]
        );
        assert_eq!(
            config.evaluation.queries,
            vec!["stroke emergency".to_string(), "major trauma case".to_string()]
        );
        cleanup_hemolink_env_vars();
    }

    #[test]
    fn test_invalid_value_keeps_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        cleanup_hemolink_env_vars();
        env::set_var("HEMOLINK_EMBEDDING_TIMEOUT_SECS", "soon");
        let config = from_env().unwrap().unwrap();
        assert_eq!(config.embedding.timeout_secs, 60);
        cleanup_hemolink_env_vars();
    }

    #[test]
    fn test_bool_parsing() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(parse_bool("on").unwrap());
        assert!(!parse_bool("false").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("invalid").is_err());
    }

    #[test]
    fn test_no_env_vars() {
        let _lock = ENV_LOCK.lock().unwrap();
        cleanup_hemolink_env_vars();
        assert!(from_env().unwrap().is_none());
    }
}
