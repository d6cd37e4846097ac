//! Error types for the Hemolink client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The access token expired and could not be refreshed. The caller must
    /// prompt for sign-in; nothing is retried past this point.
    #[error("Session expired, sign-in required")]
    SessionExpired,

    /// Non-2xx response surfaced verbatim: validation, not-found, conflict.
    /// Never retried.
    #[error("Request rejected with status {status}")]
    Rejected {
        status: u16,
        body: serde_json::Value,
    },

    /// The request produced no response at all. Retry policy for transient
    /// network failure belongs to the caller, not this layer.
    #[error("Server unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExecutorError>;
