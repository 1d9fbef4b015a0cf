//! Management API error types.
//!
//! This module defines error types that distinguish between an object that is
//! gone and a call that failed. The distinction drives the lifecycle:
//!
//! - **NotFound** / **Forbidden** mean the object is absent from the caller's
//!   point of view. Reads and deletes recover from these locally; the poller
//!   treats them as "removed". Forbidden is included because the API revokes
//!   access to an object before it finishes deleting it.
//! - Everything else is a failed remote call and is fatal to the operation.
//!   Nothing is retried automatically.

use std::fmt;
use thiserror::Error;

/// The kind of management API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// HTTP 404.
    NotFound,

    /// HTTP 403.
    Forbidden,

    /// Any other non-success HTTP status.
    Status,

    /// The request never produced a response (connection, TLS, timeout).
    Transport,

    /// The response body could not be decoded.
    Decode,

    /// The interpreter answered an effect with the wrong response variant.
    UnexpectedResponse,
}

impl ApiErrorKind {
    /// Returns true if the error means the object no longer exists for us.
    pub fn is_absent(&self) -> bool {
        matches!(self, ApiErrorKind::NotFound | ApiErrorKind::Forbidden)
    }
}

/// A management API error with categorization.
#[derive(Debug, Error)]
pub struct ApiError {
    /// The kind of error.
    pub kind: ApiErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying HTTP client error, if available.
    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "management API error (HTTP {}): {}", code, self.message),
            None => write!(f, "management API error: {}", self.message),
        }
    }
}

impl ApiError {
    fn new(kind: ApiErrorKind, status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, Some(404), message)
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Forbidden, Some(403), message)
    }

    /// Creates a transport error without an HTTP client source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, None, message)
    }

    /// Creates an error for a response variant that does not fit the effect.
    pub fn unexpected_response(operation: &str, got: &str) -> Self {
        Self::new(
            ApiErrorKind::UnexpectedResponse,
            None,
            format!("{} returned unexpected response: {}", operation, got),
        )
    }

    /// Categorizes a non-success HTTP status and its body.
    pub fn from_status(status_code: u16, body: &str) -> Self {
        let kind = match status_code {
            404 => ApiErrorKind::NotFound,
            403 => ApiErrorKind::Forbidden,
            _ => ApiErrorKind::Status,
        };
        Self::new(kind, Some(status_code), api_message(body))
    }

    /// Categorizes a reqwest error.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let kind = if err.is_decode() {
            ApiErrorKind::Decode
        } else {
            match status_code {
                Some(404) => ApiErrorKind::NotFound,
                Some(403) => ApiErrorKind::Forbidden,
                Some(_) => ApiErrorKind::Status,
                None => ApiErrorKind::Transport,
            }
        };

        Self {
            kind,
            status_code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Returns true if the error means the object no longer exists for us.
    pub fn is_absent(&self) -> bool {
        self.kind.is_absent()
    }
}

/// Extracts the `message` field of a management API error body, falling back
/// to the raw body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
