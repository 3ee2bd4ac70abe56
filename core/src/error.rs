//! Error types for the CanLII API client.
//!
//! # Design
//! Every failure surfaces as one `Error` value whose variant names the kind
//! of failure and whose payload is the human-readable message. Callers can
//! match a single variant (`Error::NotFound(_)`) or handle the whole enum.
//! Transport failures are described separately by `TransportError` and
//! converted at the executor boundary.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the client and the resource operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The configuration is not ready for a network call (e.g. no API key).
    #[error("{0}")]
    Validation(String),

    /// The server returned 401 or 403.
    #[error("{0}")]
    Authentication(String),

    /// The server returned 404.
    #[error("{0}")]
    NotFound(String),

    /// The server returned 429.
    #[error("{0}")]
    RateLimit(String),

    /// Any other non-2xx status, or a 2xx body that is not valid JSON.
    #[error("{0}")]
    Response(String),

    /// The transport gave up waiting for the server.
    #[error("{0}")]
    Timeout(String),

    /// Any other transport failure (DNS, refused, reset).
    #[error("{0}")]
    Connection(String),
}

/// Fieldless discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    NotFound,
    RateLimit,
    Response,
    Timeout,
    Connection,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::RateLimit(_) => ErrorKind::RateLimit,
            Error::Response(_) => ErrorKind::Response,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Connection(_) => ErrorKind::Connection,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Validation(msg)
            | Error::Authentication(msg)
            | Error::NotFound(msg)
            | Error::RateLimit(msg)
            | Error::Response(msg)
            | Error::Timeout(msg)
            | Error::Connection(msg) => msg,
        }
    }
}

/// Failures reported by a [`Transport`](crate::http::Transport) before any
/// HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}
