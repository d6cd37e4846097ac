//! Error types for Hemolink Auth

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Signup rejected: {0}")]
    SignupRejected(String),

    /// The refresh token was missing, rejected, or unusable. The session has
    /// been cleared; the caller must sign in again.
    #[error("Refresh token rejected, sign-in required")]
    RefreshInvalid,

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
