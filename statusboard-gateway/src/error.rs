//! Error types for the backend gateway.

use thiserror::Error;

/// Errors that can occur when talking to the backend or probing a service.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed or the backend returned an unexpected status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The write succeeded at the HTTP level but touched no rows.
    ///
    /// Row-level security filters rows silently, so this is how a missing
    /// permission shows up.
    #[error("Failed to {0} service. You may not have permission.")]
    PermissionDenied(String),

    /// Unique constraint violation.
    #[error("{0}")]
    Duplicate(String),

    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Gateway is missing required configuration.
    #[error("Not configured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_connect() {
            GatewayError::Connection(err.to_string())
        } else if err.is_decode() {
            GatewayError::Parse(err.to_string())
        } else {
            GatewayError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Parse(err.to_string())
    }
}
