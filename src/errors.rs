//! Error types for taskrouter
//!
//! One tagged error type for the whole dispatch pipeline. Extraction failures
//! carry the stage that failed; transport failures carry the underlying reason
//! verbatim so handlers can surface it in their `ToolResult`.

use crate::extraction::ExtractionError;
use thiserror::Error;

/// Main error type for the dispatch pipeline
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Router state machine transition errors
    #[error("Invalid state transition from {from} on {event}: {reason}")]
    InvalidTransition {
        from: String,
        event: String,
        reason: String,
    },

    /// Classification service could not be reached or answered with a failure
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Free text could not be turned into a structured command
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A name identifier matched more than one employee
    #[error("Ambiguous identifier: {kind} = {value} matches {matches} employees, use the employee id instead")]
    AmbiguousIdentifier {
        kind: String,
        value: String,
        matches: usize,
    },

    /// Generation service errors (bad status, malformed body)
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Relational store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Mail transport errors
    #[error("Mail transport error: {0}")]
    Mail(String),

    /// Per-call deadline expired
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DispatchError {
    /// Whether the error came from an external collaborator's transport
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DispatchError::Http(_)
                | DispatchError::LlmApi(_)
                | DispatchError::Timeout { .. }
                | DispatchError::ClassifierUnavailable(_)
        )
    }
}

impl From<rusqlite::Error> for DispatchError {
    fn from(err: rusqlite::Error) -> Self {
        DispatchError::Database(err.to_string())
    }
}

impl From<r2d2::Error> for DispatchError {
    fn from(err: r2d2::Error) -> Self {
        DispatchError::Database(format!("connection pool: {}", err))
    }
}

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;
