//! Error types for the dog API client.
//!
//! # Design
//! Any non-2xx response lands in `HttpError` with the raw status code and
//! body, whatever the operation. Transport, JSON and I/O failures are
//! propagated as their own variants without extra interpretation.

use thiserror::Error;

/// Result alias used across the client.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by `DogClient` and `DogApi`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("received a {status} error from the API: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The transport could not complete the round trip.
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Reading an upload stream failed.
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),

    /// A request URL could not be built from the configured base URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The client configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Status code of an `HttpError`, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of an `HttpError`, if this is one.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::HttpError { body, .. } => Some(body),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True for 4xx responses.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(s) if (400..500).contains(&s))
    }
}
