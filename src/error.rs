use thiserror::Error;

/// Common result type used across the SDK.
pub type Result<T> = std::result::Result<T, ChromaError>;

/// Unified error enum surfaced by all public APIs.
#[derive(Error, Debug)]
pub enum ChromaError {
    #[error("config error: {0}")]
    Config(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("transport error: status {status}: {body}")]
    Transport { status: u16, body: String },
    #[error("connection error: {0}")]
    Connection(String),
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for ChromaError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => ChromaError::Transport {
                status: status.as_u16(),
                body: value.to_string(),
            },
            None => ChromaError::Connection(value.to_string()),
        }
    }
}
