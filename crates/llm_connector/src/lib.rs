// crates/llm_connector/src/lib.rs

use async_trait::async_trait;
use talapker_core::{ChatMessage, TalapkerResult};
use tracing::{debug, warn};

pub mod ollama;
pub mod prompt_builder;

pub use ollama::OllamaChatProvider;
pub use prompt_builder::PromptBuilder;

/// Returned when the upstream answers successfully but produces no text
/// even after the higher-temperature retry.
pub const STATIC_FALLBACK: &str =
    "Помогу по WKATU: поступление, программы, гранты, общежитие. Что интересно?";

const RETRY_TEMPERATURE_STEP: f32 = 0.2;
const RETRY_TEMPERATURE_CAP: f32 = 0.8;

/// Chat-completions backend.
///
/// `Ok` carries the (possibly empty) generated text; an empty success is a
/// distinct outcome from `Err` and the two must never be collapsed — the
/// gateway retries only on the former.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> TalapkerResult<String>;

    fn name(&self) -> &str;
}

/// Wraps a provider with the service's generation policy: one call at the
/// configured temperature, one retry at a raised temperature when the reply
/// is empty, then a static fallback. Errors propagate immediately.
pub struct ChatGateway {
    provider: Box<dyn ChatProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl ChatGateway {
    pub fn new(provider: Box<dyn ChatProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    pub async fn answer(&self, messages: &[ChatMessage]) -> TalapkerResult<String> {
        let first = self
            .provider
            .complete(messages, self.temperature, self.max_tokens)
            .await?;
        if !first.is_empty() {
            return Ok(first);
        }

        let retry_temperature = (self.temperature + RETRY_TEMPERATURE_STEP).min(RETRY_TEMPERATURE_CAP);
        debug!(
            provider = self.provider.name(),
            temperature = retry_temperature,
            "empty completion, retrying"
        );

        let second = self
            .provider
            .complete(messages, retry_temperature, self.max_tokens)
            .await?;
        if !second.is_empty() {
            return Ok(second);
        }

        warn!(
            provider = self.provider.name(),
            "empty completion after retry, using static fallback"
        );
        Ok(STATIC_FALLBACK.to_string())
    }
}
