// crates/config/src/lib.rs

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use talapker_core::{TalapkerError, TalapkerResult};

pub mod validator;

pub use validator::ConfigValidator;

/// Static service configuration. Read from the environment once at startup
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Ollama-compatible upstream, trailing slash stripped.
    pub ollama_url: String,
    pub gen_model: String,
    pub embed_model: String,
    /// Soft similarity threshold: minimum confidence for intent hints.
    pub threshold: f32,
    /// Hard similarity threshold: minimum confidence for canned answers.
    pub threshold_hard: f32,
    pub history_limit: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_s: u64,
    /// When set, `/ask` short-circuits and classification is left to the
    /// generative path.
    pub always_chat: bool,
    /// Enables canned answers in the hybrid path.
    pub use_mini: bool,
    pub host: String,
    pub port: u16,
    /// Optional YAML/JSON phrase-bank catalogue override.
    pub phrase_bank_path: Option<PathBuf>,
    /// Optional YAML/JSON canned-answer catalogue override.
    pub mini_answers_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://ollama:11434".to_string(),
            gen_model: "qwen2.5:3b-instruct-q4_0".to_string(),
            embed_model: "paraphrase-multilingual-minilm".to_string(),
            threshold: 0.84,
            threshold_hard: 0.88,
            history_limit: 16,
            temperature: 0.3,
            max_tokens: 300,
            request_timeout_s: 120,
            always_chat: true,
            use_mini: true,
            host: "0.0.0.0".to_string(),
            port: 8000,
            phrase_bank_path: None,
            mini_answers_path: None,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from environment variables, falling back to
    /// defaults for anything unset. Unparseable values are configuration
    /// errors rather than silent defaults.
    pub fn from_env() -> TalapkerResult<Self> {
        let defaults = Self::default();

        let config = Self {
            ollama_url: env_string("OLLAMA_URL", &defaults.ollama_url)
                .trim_end_matches('/')
                .to_string(),
            gen_model: env_string("GEN_MODEL", &defaults.gen_model),
            embed_model: env_string("EMBED_MODEL", &defaults.embed_model),
            threshold: env_parse("SIM_THRESHOLD", defaults.threshold)?,
            threshold_hard: env_parse("SIM_THRESHOLD_HARD", defaults.threshold_hard)?,
            history_limit: env_parse("HISTORY_LIMIT", defaults.history_limit)?,
            temperature: env_parse("LLM_TEMPERATURE", defaults.temperature)?,
            max_tokens: env_parse("LLM_MAX_TOKENS", defaults.max_tokens)?,
            request_timeout_s: env_parse("REQUEST_TIMEOUT", defaults.request_timeout_s)?,
            always_chat: env_bool("ALWAYS_CHAT", defaults.always_chat),
            use_mini: env_bool("USE_MINI", defaults.use_mini),
            host: env_string("HOST", &defaults.host),
            port: env_parse("PORT", defaults.port)?,
            phrase_bank_path: env_path("PHRASE_BANK_PATH"),
            mini_answers_path: env_path("MINI_ANSWERS_PATH"),
        };

        ConfigValidator::validate(&config)?;

        Ok(config)
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => value.trim().eq_ignore_ascii_case("true"),
        Err(_) => default,
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}

fn env_parse<T>(key: &str, default: T) -> TalapkerResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(value) => value.trim().parse::<T>().map_err(|e| {
            TalapkerError::Config(format!("Invalid value for {}: '{}' ({})", key, value, e))
        }),
        Err(_) => Ok(default),
    }
}
