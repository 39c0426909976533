//! Error types for video generation dispatch.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest provider error body embedded in an error message.
const MAX_ERROR_BODY_CHARS: usize = 1000;

/// Errors that can occur while normalizing, dispatching or running a
/// video generation request.
#[derive(Debug, thiserror::Error)]
pub enum VidGenError {
    /// Malformed input rejected before dispatch.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No descriptor is registered for the provider id.
    #[error("provider {0} not found")]
    ProviderNotFound(String),

    /// The provider is registered but has no adapter.
    #[error("provider {0} not implemented")]
    ProviderNotImplemented(String),

    /// No credential was supplied for a provider that requires one.
    #[error("{provider} API key required")]
    MissingCredential { provider: String },

    /// Provider rejected the credential (HTTP 401).
    #[error("{provider} authentication failed ({status}): {message}")]
    AuthenticationFailed {
        provider: String,
        status: u16,
        message: String,
    },

    /// Provider rate limit exceeded (HTTP 429).
    #[error("{provider} rate limit exceeded ({status}): {message}")]
    RateLimited {
        provider: String,
        status: u16,
        message: String,
    },

    /// Account has no credits left (HTTP 402).
    #[error("{provider} insufficient credits ({status}): {message}")]
    InsufficientCredits {
        provider: String,
        status: u16,
        message: String,
    },

    /// Any other non-success HTTP status.
    #[error("{provider} API error ({status}): {message}")]
    ProviderError {
        provider: String,
        status: u16,
        message: String,
    },

    /// Successful response carried no video locator.
    #[error("no video URL returned from {0} API")]
    NoVideoReturned(String),

    /// Job submission response carried no task identifier.
    #[error("no task ID returned from {0} API")]
    NoTaskId(String),

    /// The provider reported the job as failed.
    #[error("{provider} generation failed: {reason}")]
    GenerationFailed { provider: String, reason: String },

    /// The provider reported the job as timed out.
    #[error("{0} generation timed out on the provider side")]
    ProviderTimeout(String),

    /// The local polling ceiling elapsed without a terminal status.
    #[error("{provider} generation timed out after {waited:?}")]
    ClientTimeout { provider: String, waited: Duration },

    /// The caller cancelled the generation call.
    #[error("generation cancelled")]
    Cancelled,

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (e.g., reading a conditioning image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An adapter faulted in an unexpected way.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable classification of a failure, suitable for callers that must not
/// parse message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    ProviderNotFound,
    ProviderNotImplemented,
    MissingCredential,
    AuthenticationFailed,
    RateLimited,
    InsufficientCredits,
    ProviderError,
    NoVideoReturned,
    NoTaskId,
    GenerationFailed,
    ProviderTimeout,
    ClientTimeout,
    Cancelled,
    Unexpected,
}

impl VidGenError {
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::ProviderNotFound(_) => ErrorKind::ProviderNotFound,
            Self::ProviderNotImplemented(_) => ErrorKind::ProviderNotImplemented,
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::InsufficientCredits { .. } => ErrorKind::InsufficientCredits,
            Self::ProviderError { .. } => ErrorKind::ProviderError,
            Self::NoVideoReturned(_) => ErrorKind::NoVideoReturned,
            Self::NoTaskId(_) => ErrorKind::NoTaskId,
            Self::GenerationFailed { .. } => ErrorKind::GenerationFailed,
            Self::ProviderTimeout(_) => ErrorKind::ProviderTimeout,
            Self::ClientTimeout { .. } => ErrorKind::ClientTimeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Network(_) | Self::Json(_) | Self::Io(_) | Self::Internal(_) => {
                ErrorKind::Unexpected
            }
        }
    }

    /// Classifies a non-success HTTP response from `provider`.
    pub fn from_status(provider: &str, status: u16, body: &str) -> Self {
        let provider = provider.to_string();
        let message = sanitize_error_message(body);
        match status {
            401 => Self::AuthenticationFailed {
                provider,
                status,
                message,
            },
            402 => Self::InsufficientCredits {
                provider,
                status,
                message,
            },
            429 => Self::RateLimited {
                provider,
                status,
                message,
            },
            _ => Self::ProviderError {
                provider,
                status,
                message,
            },
        }
    }
}

/// Trims a provider error body and bounds its length.
pub(crate) fn sanitize_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty response body>".to_string();
    }
    if trimmed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return trimmed.to_string();
    }
    let mut truncated: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    truncated.push_str("...");
    truncated
}

/// Result type alias for video generation operations.
pub type Result<T> = std::result::Result<T, VidGenError>;
