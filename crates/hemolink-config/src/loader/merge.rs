//! Configuration merging logic
//!
//! Merges configurations from multiple sources with proper precedence.

use crate::{types::*, Config};

/// Merge two configurations, with `overlay` taking precedence
///
/// This performs a deep merge where non-default values from `overlay`
/// override values in `base`.
pub fn merge(mut base: Config, overlay: Config) -> Config {
    base.data = merge_data(base.data, overlay.data);
    base.ranking = merge_ranking(base.ranking, overlay.ranking);
    base.relevance = merge_relevance(base.relevance, overlay.relevance);
    base.embedding = merge_embedding(base.embedding, overlay.embedding);
    base.evaluation = merge_evaluation(base.evaluation, overlay.evaluation);

    base
}

fn pick<T: PartialEq>(base: T, overlay: T, default: &T) -> T {
    if overlay != *default {
        overlay
    } else {
        base
    }
}

fn pick_f64(base: f64, overlay: f64, default: f64) -> f64 {
    if (overlay - default).abs() > 1e-9 {
        overlay
    } else {
        base
    }
}

fn merge_data(base: DataConfig, overlay: DataConfig) -> DataConfig {
    let default = DataConfig::default();
    DataConfig {
        snapshot_path: pick(base.snapshot_path, overlay.snapshot_path, &default.snapshot_path),
    }
}

fn merge_ranking(base: RankingConfig, overlay: RankingConfig) -> RankingConfig {
    let default = RankingConfig::default();
    RankingConfig {
        vector: pick_f64(base.vector, overlay.vector, default.vector),
        distance: pick_f64(base.distance, overlay.distance, default.distance),
        response: pick_f64(base.response, overlay.response, default.response),
        rating: pick_f64(base.rating, overlay.rating, default.rating),
        top_k: pick(base.top_k, overlay.top_k, &default.top_k),
        allow_degraded: pick(
            base.allow_degraded,
            overlay.allow_degraded,
            &default.allow_degraded,
        ),
    }
}

fn merge_relevance(base: RelevanceConfig, overlay: RelevanceConfig) -> RelevanceConfig {
    let default = RelevanceConfig::default();
    RelevanceConfig {
        near_km: pick_f64(base.near_km, overlay.near_km, default.near_km),
        mid_km: pick_f64(base.mid_km, overlay.mid_km, default.mid_km),
        blood_units_high: pick(
            base.blood_units_high,
            overlay.blood_units_high,
            &default.blood_units_high,
        ),
        icu_beds_high: pick(
            base.icu_beds_high,
            overlay.icu_beds_high,
            &default.icu_beds_high,
        ),
    }
}

fn merge_embedding(base: EmbeddingConfig, overlay: EmbeddingConfig) -> EmbeddingConfig {
    let default = EmbeddingConfig::default();
    EmbeddingConfig {
        backend: pick(base.backend, overlay.backend, &default.backend),
        model_name: pick(base.model_name, overlay.model_name, &default.model_name),
        base_url: overlay.base_url.or(base.base_url),
        timeout_secs: pick(base.timeout_secs, overlay.timeout_secs, &default.timeout_secs),
    }
}

fn merge_evaluation(base: EvaluationConfig, overlay: EvaluationConfig) -> EvaluationConfig {
    let default = EvaluationConfig::default();
    EvaluationConfig {
        queries: pick(base.queries, overlay.queries, &default.queries),
        city: pick(base.city, overlay.city, &default.city),
        user_lat: pick_f64(base.user_lat, overlay.user_lat, default.user_lat),
        user_lon: pick_f64(base.user_lon, overlay.user_lon, default.user_lon),
        blood_type: pick(base.blood_type, overlay.blood_type, &default.blood_type),
        k: pick(base.k, overlay.k, &default.k),
        strategies: pick(base.strategies, overlay.strategies, &default.strategies),
        concurrency: pick(base.concurrency, overlay.concurrency, &default.concurrency),
        fetch_timeout_secs: pick(
            base.fetch_timeout_secs,
            overlay.fetch_timeout_secs,
            &default.fetch_timeout_secs,
        ),
        mrr_weight: pick_f64(base.mrr_weight, overlay.mrr_weight, default.mrr_weight),
        ndcg_weight: pick_f64(base.ndcg_weight, overlay.ndcg_weight, default.ndcg_weight),
        distance_weight: pick_f64(
            base.distance_weight,
            overlay.distance_weight,
            default.distance_weight,
        ),
    }
}
