// crates/embedding/src/ollama.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use talapker_core::{TalapkerError, TalapkerResult};
use tracing::debug;

use crate::{l2_normalize, Embedder};

/// Embedding client for Ollama's batch `/api/embed` endpoint.
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str) -> TalapkerResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| TalapkerError::Embedding(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> TalapkerResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await
            .map_err(|e| TalapkerError::Embedding(format!("Embed request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TalapkerError::Embedding(format!(
                "Embed API error {}: {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| TalapkerError::Embedding(format!("Malformed embed response: {}", e)))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(TalapkerError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        debug!(count = texts.len(), model = %self.model, "embedded batch");

        let mut vectors = parsed.embeddings;
        for vector in &mut vectors {
            l2_normalize(vector);
        }

        Ok(vectors)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
