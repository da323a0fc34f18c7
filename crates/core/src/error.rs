//! Error types for DocQA.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! document extraction, remote model services, the vector index and the
//! prompt system. Remote service failures carry a [`ServiceFailure`] so
//! callers can tell transient problems (quota, timeouts, outages) from
//! permanent ones (bad credential, malformed request).

use std::fmt;
use thiserror::Error;

/// Unified error type for DocQA.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A user action was rejected before any work started
    #[error("{0}")]
    Validation(String),

    /// A single document could not be parsed
    #[error("Failed to extract text from '{file}': {message}")]
    Extraction { file: String, message: String },

    /// The document format is outside the supported set (PDF, DOCX)
    #[error("Unsupported document format for '{0}'. Supported formats: .pdf, .docx")]
    UnsupportedFormat(String),

    /// The remote embedding API failed
    #[error("Embedding service error: {0}")]
    EmbeddingService(ServiceFailure),

    /// The remote generative-model API failed
    #[error("Generation service error: {0}")]
    GenerationService(ServiceFailure),

    /// No index has been built yet
    #[error("{0}")]
    NotReady(String),

    /// The persisted index was built with a different embedding model
    #[error("Index was built with embedding model '{found}' but '{expected}' is configured. Process the documents again.")]
    ModelMismatch { expected: String, found: String },

    /// Vector index persistence and search errors
    #[error("Index error: {0}")]
    Index(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether retrying the same action later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::EmbeddingService(failure) | AppError::GenerationService(failure) => {
                failure.is_transient()
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Category of a remote service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Credential rejected (401/403)
    Auth,
    /// Rate limit or quota exhausted (429)
    Quota,
    /// Server-side failure (5xx)
    Unavailable,
    /// The request did not complete within the configured timeout
    Timeout,
    /// Connection-level failure
    Network,
    /// The service rejected the request (other 4xx)
    InvalidRequest,
    /// The response could not be interpreted
    MalformedResponse,
}

impl ServiceErrorKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "authentication failed",
            Self::Quota => "quota exceeded",
            Self::Unavailable => "service unavailable",
            Self::Timeout => "request timed out",
            Self::Network => "network error",
            Self::InvalidRequest => "invalid request",
            Self::MalformedResponse => "malformed response",
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure reported by a remote model API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceFailure {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ServiceErrorKind::Auth,
            429 => ServiceErrorKind::Quota,
            500..=599 => ServiceErrorKind::Unavailable,
            _ => ServiceErrorKind::InvalidRequest,
        };

        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, body)
        };

        Self { kind, message }
    }

    /// Transient failures may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ServiceErrorKind::Quota
                | ServiceErrorKind::Unavailable
                | ServiceErrorKind::Timeout
                | ServiceErrorKind::Network
        )
    }
}

impl fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.message)
    }
}

impl std::error::Error for ServiceFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ServiceFailure::from_status(401, "").kind,
            ServiceErrorKind::Auth
        );
        assert_eq!(
            ServiceFailure::from_status(403, "denied").kind,
            ServiceErrorKind::Auth
        );
        assert_eq!(
            ServiceFailure::from_status(429, "slow down").kind,
            ServiceErrorKind::Quota
        );
        assert_eq!(
            ServiceFailure::from_status(503, "").kind,
            ServiceErrorKind::Unavailable
        );
        assert_eq!(
            ServiceFailure::from_status(400, "bad").kind,
            ServiceErrorKind::InvalidRequest
        );
    }

    #[test]
    fn test_transient_failures() {
        assert!(ServiceFailure::from_status(429, "").is_transient());
        assert!(ServiceFailure::from_status(502, "").is_transient());
        assert!(ServiceFailure::new(ServiceErrorKind::Timeout, "slow").is_transient());
        assert!(!ServiceFailure::from_status(401, "").is_transient());
        assert!(!ServiceFailure::new(ServiceErrorKind::MalformedResponse, "x").is_transient());
    }

    #[test]
    fn test_app_error_transience() {
        let quota = AppError::EmbeddingService(ServiceFailure::from_status(429, ""));
        assert!(quota.is_transient());

        let auth = AppError::GenerationService(ServiceFailure::from_status(401, ""));
        assert!(!auth.is_transient());

        assert!(!AppError::NotReady("no index".to_string()).is_transient());
    }

    #[test]
    fn test_failure_message_includes_body() {
        let failure = ServiceFailure::from_status(400, "  API key not valid  ");
        assert_eq!(failure.message, "HTTP 400: API key not valid");
        assert!(failure.to_string().contains("invalid request"));
    }
}
