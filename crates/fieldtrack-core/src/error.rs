//! Error types for the fieldtrack engine

use thiserror::Error;

/// Result type alias for fieldtrack operations
pub type TrackResult<T> = Result<T, TrackError>;

/// Main error type for the fieldtrack engine
#[derive(Error, Debug, Clone)]
pub enum TrackError {
    /// Location or background-execution authorization was refused.
    /// Fatal to starting a session; never retried automatically.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The remote authority answered with a non-2xx status
    #[error("Remote authority error: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// No location fix could be obtained this attempt. Transient; the
    /// next scheduled tick retries independently.
    #[error("Location acquisition failed: {0}")]
    Acquisition(String),

    /// Local validation failed before any network call was made
    #[error("Precondition not met: {0}")]
    Precondition(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Malformed response body from the authority
    #[error("JSON error: {0}")]
    Json(String),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The owning task was cancelled
    #[error("Operation was cancelled")]
    Cancelled,
}

impl TrackError {
    /// Create a new permission error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Create a new remote authority error without a status code
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// Create a new remote authority error carrying the HTTP status
    pub fn remote_status(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create a new acquisition error
    pub fn acquisition(message: impl Into<String>) -> Self {
        Self::Acquisition(message.into())
    }

    /// Create a new precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Create a new HTTP transport error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }

    /// Create a new JSON decode error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this failure is transient and self-heals without user
    /// action (absorbed locally, surfaced only as a notice)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Acquisition(_) | Self::Http(_) | Self::Remote { .. })
    }
}

impl From<reqwest::Error> for TrackError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}
