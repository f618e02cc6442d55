//! Error types for the ragdesk client.
//!
//! Every variant displays as its bare message so that a backend-provided
//! `detail` reaches the user unchanged.

use thiserror::Error;

/// Message shown when a failed backend response carries no usable `detail`.
pub const FALLBACK_ERROR_MESSAGE: &str = "The request failed. Please try again later.";

/// Message used when a call is attempted without a session.
pub const NO_TOKEN_MESSAGE: &str = "no token available";

/// Client-level errors.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Missing, rejected or expired credentials.
    #[error("{0}")]
    Authentication(String),

    /// Backend refused the call for the current principal (403).
    #[error("{0}")]
    Authorization(String),

    /// Any other non-2xx backend response.
    #[error("{message}")]
    BackendRequest { status: u16, message: String },

    /// Local input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// Response body did not match the expected schema.
    #[error("Unexpected response from {endpoint}: {reason}")]
    Schema { endpoint: String, reason: String },

    /// Required configuration is absent or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Session store could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Short machine-friendly kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Authentication(_) => "authentication",
            ClientError::Authorization(_) => "authorization",
            ClientError::BackendRequest { .. } => "backend_request",
            ClientError::Validation(_) => "validation",
            ClientError::Schema { .. } => "schema",
            ClientError::Config(_) => "config",
            ClientError::Transport(_) => "transport",
            ClientError::Io(_) => "io",
            ClientError::Storage(_) => "storage",
        }
    }

    /// Build the error for a failed backend response.
    ///
    /// The message is the body's `detail` string when present, otherwise
    /// [`FALLBACK_ERROR_MESSAGE`].
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_detail(body).unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
        match status {
            401 => ClientError::Authentication(message),
            403 => ClientError::Authorization(message),
            _ => ClientError::BackendRequest { status, message },
        }
    }

    pub fn no_token() -> Self {
        ClientError::Authentication(NO_TOKEN_MESSAGE.to_string())
    }
}

/// Pull a non-empty `detail` string out of a JSON error body.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?.as_str()?;
    if detail.is_empty() {
        None
    } else {
        Some(detail.to_string())
    }
}

impl From<serde_yaml::Error> for ClientError {
    fn from(err: serde_yaml::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<envy::Error> for ClientError {
    fn from(err: envy::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

/// Result type alias using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;
