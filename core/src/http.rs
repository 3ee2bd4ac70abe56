//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `Client` builds an `HttpRequest`,
//! hands it to a `Transport`, and parses the `HttpResponse` that comes back.
//! The transport only moves bytes: a non-2xx status is a normal response,
//! and only failures before a status arrives become a `TransportError`.
//!
//! The client is read-only, so every request is a GET and no method or body
//! is carried.

use std::time::Duration;

use crate::error::TransportError;

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL without the query string.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Look up a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// A body that is not valid UTF-8 is carried lossily; the client only ever
/// parses it as JSON or quotes it in an error message.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Executes one `HttpRequest` against the network.
///
/// Implementations must return every received response as `Ok`, whatever
/// its status code.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}
