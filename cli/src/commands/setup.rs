use anyhow::{Context, Result};
use hemolink_config::{Config, Validate};
use hemolink_context::select_embedder;
use hemolink_core::traits::Embedder;
use hemolink_store::SnapshotStore;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::ui::print_warning;

/// Loads config from `--config` or the default locations, then applies the
/// `--data` override.
pub fn load_config(config_path: Option<&Path>, data: Option<&Path>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(data) = data {
        config.data.snapshot_path = data.to_path_buf();
    }
    Ok(config)
}

/// Re-validates after command-line overrides.
pub fn finalize(config: Config) -> Result<Config> {
    config.validate()?;
    Ok(config)
}

pub fn open_store(config: &Config) -> Result<SnapshotStore> {
    let path = &config.data.snapshot_path;
    let store = SnapshotStore::load(path)
        .with_context(|| format!("set data.snapshot_path or pass --data (tried {})", path.display()))?;
    if store.is_empty() {
        print_warning(&format!("snapshot {} holds no hospitals", path.display()));
    }
    Ok(store)
}

/// Selects the embedder. With `tolerate_missing`, setup failures are
/// reported and `None` is returned instead of an error.
pub fn embedder(config: &Config, tolerate_missing: bool) -> Result<Option<Arc<dyn Embedder + Send + Sync>>> {
    match select_embedder(&config.embedding) {
        Ok(embedder) => Ok(Some(embedder)),
        Err(e) if tolerate_missing => {
            print_warning(&format!("no embedding provider: {:#}", e));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Hint shown by read-only commands when some profiles have no embedding.
pub fn missing_embeddings_notice(store: &SnapshotStore) -> Option<String> {
    match store.missing_embeddings() {
        0 => None,
        missing => Some(format!(
            "{} of {} hospitals have no embedding and are left out of similarity ranking; run `hemolink embed` to fill them in",
            missing,
            store.len()
        )),
    }
}

/// Embeds profiles missing from the snapshot, behind a spinner.
pub async fn embed_missing(
    store: &mut SnapshotStore,
    embedder: &dyn Embedder,
    batch_size: usize,
) -> Result<usize> {
    let missing = store.missing_embeddings();
    if missing == 0 {
        return Ok(0);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message(format!("Embedding {} hospital profiles...", missing));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = store.embed_missing(embedder, batch_size).await;
    match &result {
        Ok(count) => spinner.finish_with_message(format!("Embedded {} hospital profiles.", count)),
        Err(_) => spinner.finish_and_clear(),
    }
    let count = result?;
    info!(count, "embedded missing hospital profiles");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hemolink_store::HospitalRecord;

    fn store(json: &str) -> SnapshotStore {
        let records: Vec<HospitalRecord> = serde_json::from_str(json).unwrap();
        SnapshotStore::from_records(records)
    }

    #[test]
    fn test_missing_embeddings_notice() {
        let partial = store(
            r#"[
              {"id": "a", "name": "A", "lat": 28.6, "lon": 77.2, "rating": 4.0,
               "avg_response_time_mins": 10, "icu_beds_available": 1,
               "blood_inventory": {"O+": 3}, "embedding": [1.0, 0.0]},
              {"id": "b", "name": "B", "lat": 28.6, "lon": 77.2, "rating": 4.0,
               "avg_response_time_mins": 10, "icu_beds_available": 1,
               "blood_inventory": {"O+": 3}}
            ]"#,
        );
        let notice = missing_embeddings_notice(&partial).unwrap();
        assert!(notice.starts_with("1 of 2 hospitals"));
        assert!(notice.contains("hemolink embed"));

        assert!(missing_embeddings_notice(&store("[]")).is_none());
    }
}
