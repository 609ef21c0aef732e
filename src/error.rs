// src/error.rs
use thiserror::Error;

/// Errors surfaced by the ticker.
#[derive(Debug, Error)]
pub enum TickerError {
    /// The data source answered with a non-success status.
    #[error("remote fetch failed: HTTP {status} {reason}")]
    RemoteFetch { status: u16, reason: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

impl TickerError {
    pub fn is_remote(&self) -> bool {
        matches!(self, TickerError::RemoteFetch { .. } | TickerError::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, TickerError>;
