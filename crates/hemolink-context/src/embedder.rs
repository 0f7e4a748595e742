use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use hemolink_config::{EmbeddingBackend, EmbeddingConfig};
use hemolink_core::traits::Embedder;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Build the embedder named by `config.backend`.
///
/// The OpenAI backend needs `OPENAI_API_KEY`. For Ollama the base URL comes
/// from the config, then `OLLAMA_BASE_URL`, then the local default.
pub fn select_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder + Send + Sync>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    match config.backend {
        EmbeddingBackend::External => {
            let api_key = env::var("OPENAI_API_KEY")
                .context("embedding.backend is 'openai' but OPENAI_API_KEY is not set")?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string());
            let embedder = ExternalEmbedder::new(&config.model_name, api_key, base_url, timeout)?;
            info!(model = %config.model_name, "using OpenAI embeddings");
            Ok(Arc::new(embedder))
        }
        EmbeddingBackend::Ollama => {
            let base_url = config
                .base_url
                .clone()
                .or_else(|| env::var("OLLAMA_BASE_URL").ok())
                .unwrap_or_else(|| OLLAMA_BASE_URL.to_string());
            let embedder = OllamaEmbedder::new(&config.model_name, base_url, timeout)?;
            info!(model = %config.model_name, url = %embedder.base_url, "using Ollama embeddings");
            Ok(Arc::new(embedder))
        }
    }
}

fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

pub struct ExternalEmbedder {
    model: String,
    api_key: String,
    base_url: String,
    client: Client,
}

impl ExternalEmbedder {
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: http_client(timeout)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingItem {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for ExternalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut list = self.embed_batch(&[text.to_string()]).await?;
        list.pop().ok_or_else(|| anyhow!("Empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let resp = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI embeddings failed ({}): {}", status, body));
        }

        let parsed: OpenAIEmbeddingResponse = resp.json().await?;
        if parsed.data.len() != texts.len() {
            return Err(anyhow!(
                "Mismatch embedding count: got {}, expected {}",
                parsed.data.len(),
                texts.len()
            ));
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

pub struct OllamaEmbedder {
    model: String,
    base_url: String,
    client: Client,
}

impl OllamaEmbedder {
    pub fn new(model: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            model: model.into(),
            base_url: base_url.into(),
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let resp = self
            .client
            .post(format!("{}/api/embeddings", self.base_url.trim_end_matches('/')))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": text,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Ollama embeddings failed ({}): {}", status, body));
        }

        let json: serde_json::Value = resp.json().await?;
        let embedding = json["embedding"]
            .as_array()
            .ok_or_else(|| anyhow!("No embedding field in Ollama response"))?
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|f| f as f32)
            .collect::<Vec<f32>>();
        if embedding.is_empty() {
            return Err(anyhow!("Ollama returned an empty embedding"));
        }
        debug!(dims = embedding.len(), "embedded text");
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}
