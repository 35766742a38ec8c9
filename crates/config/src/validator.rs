// crates/config/src/validator.rs

use talapker_core::{TalapkerError, TalapkerResult};

use crate::AppConfig;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> TalapkerResult<()> {
        if config.ollama_url.trim().is_empty() {
            return Err(TalapkerError::Config(
                "OLLAMA_URL must not be empty".to_string(),
            ));
        }

        if config.threshold_hard < config.threshold {
            return Err(TalapkerError::Config(format!(
                "SIM_THRESHOLD_HARD ({}) must be >= SIM_THRESHOLD ({})",
                config.threshold_hard, config.threshold
            )));
        }

        for (name, value) in [
            ("SIM_THRESHOLD", config.threshold),
            ("SIM_THRESHOLD_HARD", config.threshold_hard),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(TalapkerError::Config(format!(
                    "{} must lie in [-1, 1], got {}",
                    name, value
                )));
            }
        }

        if config.history_limit == 0 {
            return Err(TalapkerError::Config(
                "HISTORY_LIMIT must be positive".to_string(),
            ));
        }

        if config.max_tokens == 0 {
            return Err(TalapkerError::Config(
                "LLM_MAX_TOKENS must be positive".to_string(),
            ));
        }

        if config.request_timeout_s == 0 {
            return Err(TalapkerError::Config(
                "REQUEST_TIMEOUT must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
