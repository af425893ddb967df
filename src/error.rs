use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("no games available: {0}")]
    Unavailable(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Network(_) => "NETWORK",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}

/// Failure of a single retrieval strategy. Never leaves the fetch chain.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("empty result")]
    EmptyResult,
    #[error("could not decode games: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RetrievalError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return Self::Decode(value.to_string());
        }
        Self::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for RetrievalError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
