//! Error types used throughout the directory client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of a [`DirectoryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid settings or caller input - never retryable
    Configuration,
    /// Token exchange with the identity provider failed
    Authentication,
    /// DNS, connect, timeout or cancellation
    Transport,
    /// Response body could not be decoded into the expected shape
    Decode,
    /// Directory answered with a non-2xx status
    Api,
    /// Operation refused because the target failed a precondition
    Precondition,
}

/// Main error type for directory operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DirectoryError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Decode error (status {status}): {message}; body: {body}")]
    Decode { status: u16, message: String, body: String },

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Precondition failed: {message}")]
    Precondition { message: String },
}

impl DirectoryError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication { message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition { message: message.into() }
    }

    /// Build a decode error, keeping at most [`MAX_BODY_EXCERPT`] bytes of the
    /// raw body.
    ///
    /// [`MAX_BODY_EXCERPT`]: crate::constants::MAX_BODY_EXCERPT
    pub fn decode(status: u16, message: impl Into<String>, body: &str) -> Self {
        Self::Decode { status, message: message.into(), body: body_excerpt(body) }
    }

    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api { status, body: body.into() }
    }

    /// Get the category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config { .. } => ErrorCategory::Configuration,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Decode { .. } => ErrorCategory::Decode,
            Self::Api { .. } => ErrorCategory::Api,
            Self::Precondition { .. } => ErrorCategory::Precondition,
        }
    }

    /// HTTP status carried by the error, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the directory reported the target as missing (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Whether a caller-side retry could plausibly succeed
    ///
    /// Only transport failures, throttling (429) and server errors (5xx)
    /// qualify. The client itself never retries on this basis.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Truncate a response body to a diagnosable excerpt on a char boundary.
pub fn body_excerpt(body: &str) -> String {
    let max = crate::constants::MAX_BODY_EXCERPT;
    if body.len() <= max {
        return body.to_string();
    }

    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

/// Result type alias for directory operations
pub type Result<T> = std::result::Result<T, DirectoryError>;
