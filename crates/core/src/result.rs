// crates/core/src/result.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TalapkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("NLU error: {0}")]
    Nlu(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type TalapkerResult<T> = Result<T, TalapkerError>;
