//! Domain errors for the QA orchestration engine.

use thiserror::Error;

/// Domain-level errors.
///
/// Per-agent failures never surface here — they are recorded in a session's
/// `skipped_reasons` and the session continues. Only session-machinery and
/// persistence defects become hard errors.
#[derive(Debug, Error)]
pub enum QaError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Persistence error at {path}: {message}")]
    Persistence { path: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Convenience alias used throughout the crate.
pub type QaResult<T> = Result<T, QaError>;

impl From<serde_json::Error> for QaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
