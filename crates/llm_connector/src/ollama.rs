// crates/llm_connector/src/ollama.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use talapker_core::{ChatMessage, TalapkerError, TalapkerResult};

use crate::ChatProvider;

/// Chat provider for an Ollama-compatible `/v1/chat/completions` upstream.
/// The request timeout is enforced by the HTTP client; exceeding it is an
/// upstream error like any other transport failure.
pub struct OllamaChatProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaChatProvider {
    pub fn new(base_url: &str, model: &str, timeout_s: u64) -> TalapkerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_s))
            .build()
            .map_err(|e| TalapkerError::Upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatProvider for OllamaChatProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> TalapkerResult<String> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "stream": false,
                "options": {
                    "temperature": temperature,
                    "num_predict": max_tokens,
                },
            }))
            .send()
            .await
            .map_err(|e| TalapkerError::Upstream(format!("Chat request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TalapkerError::Upstream(format!(
                "Chat API error {}: {}",
                status, body
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| TalapkerError::Upstream(format!("Malformed chat response: {}", e)))?;

        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TalapkerError::Upstream("Chat response is missing message content".to_string())
            })?;

        Ok(content.trim().to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
