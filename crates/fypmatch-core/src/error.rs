//! Error types for fypmatch.

use thiserror::Error;

/// Result type alias using fypmatch's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fypmatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Scoring service is temporarily unavailable (rate limited, 5xx, timeout).
    ///
    /// This is the only error the matching loop recovers from.
    #[error("Scoring service unavailable: {0}")]
    ScoringUnavailable(String),

    /// Scoring service answered, but the answer could not be used.
    #[error("Malformed scores: {0}")]
    MalformedScores(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Job processing error
    #[error("Job error: {0}")]
    Job(String),

    /// Job status storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the failure is expected to clear up on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::ScoringUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            Error::ScoringUnavailable(e.to_string())
        } else {
            Error::Request(e.to_string())
        }
    }
}
