use super::setup::{embed_missing, embedder, load_config, open_store};
use super::ui::{print_key_value, print_success};
use anyhow::{anyhow, Result};
use std::path::Path;

/// Fills in missing profile embeddings and writes the snapshot back.
pub async fn handle_embed(batch: usize, config_path: Option<&Path>, data: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, data)?;
    let mut store = open_store(&config)?;
    let embedder = embedder(&config, false)?.ok_or_else(|| anyhow!("no embedding provider"))?;

    let count = embed_missing(&mut store, embedder.as_ref(), batch).await?;
    if count == 0 {
        print_success("every hospital already has an embedding");
        return Ok(());
    }

    store.save(&config.data.snapshot_path)?;
    print_key_value("Hospitals", &store.len().to_string());
    print_success(&format!(
        "embedded {} profiles into {}",
        count,
        config.data.snapshot_path.display()
    ));
    Ok(())
}
