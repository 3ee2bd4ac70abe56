//! Request executor for the CanLII REST API.
//!
//! # Design
//! `Client` owns a `Configuration` snapshot and a `Transport`. Each call is
//! split into `build_request` (path + merged query → `HttpRequest`) and
//! `parse_response` (`HttpResponse` → JSON value or typed error), and `get`
//! runs exactly one round trip between the two. No retries, no caching.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{self, Configuration};
use crate::error::{Error, Result, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::transport::UreqTransport;

/// Query parameters, ordered so the generated query string is stable.
pub type QueryParams = BTreeMap<String, String>;

/// Anything that can answer a GET against the API with a parsed payload.
///
/// `Client` is the real implementation; `context::with_client` lets callers
/// install another one (a stub, a recorder) for a bounded unit of work.
pub trait ApiClient {
    fn get(&self, path: &str, params: &QueryParams) -> Result<Value>;
}

/// Blocking client that issues one GET per call.
#[derive(Clone)]
pub struct Client {
    config: Configuration,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client over the default ureq transport.
    pub fn new(config: Configuration) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(config: Configuration, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    /// Client over a snapshot of the process-wide configuration.
    pub fn from_global() -> Self {
        Self::new(config::configuration())
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Build the GET for `path`.
    ///
    /// `api_key` and `language` always come from the configuration and
    /// replace caller-supplied parameters of the same name.
    pub fn build_request(&self, path: &str, extra: &QueryParams) -> HttpRequest {
        let mut params = extra.clone();
        params.insert(
            "api_key".to_string(),
            self.config.api_key.clone().unwrap_or_default(),
        );
        params.insert("language".to_string(), self.config.language.clone());

        HttpRequest {
            url: format!("{}{path}", self.config.base_url.trim_end_matches('/')),
            query: params.into_iter().collect(),
            timeout: self.config.timeout,
        }
    }

    /// Classify the status and parse a 2xx body as JSON.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        check_status(&response)?;
        serde_json::from_str(&response.body)
            .map_err(|e| Error::Response(format!("Invalid JSON response: {e}")))
    }

    fn map_transport_error(&self, err: TransportError) -> Error {
        match err {
            TransportError::Timeout => match self.config.timeout {
                Some(timeout) => Error::Timeout(format!(
                    "Request timed out after {} seconds",
                    format_seconds(timeout)
                )),
                None => Error::Timeout("Request timed out".to_string()),
            },
            TransportError::Other(msg) => Error::Connection(format!("Network error: {msg}")),
        }
    }
}

impl ApiClient for Client {
    fn get(&self, path: &str, params: &QueryParams) -> Result<Value> {
        tracing::dispatcher::with_default(&self.config.logger, || {
            let request = self.build_request(path, params);
            debug!(url = %request.url, "GET");

            let result = self
                .transport
                .execute(&request)
                .map_err(|e| self.map_transport_error(e))
                .and_then(|response| self.parse_response(response));

            if let Err(err) = &result {
                warn!(kind = ?err.kind(), error = %err, path, "request failed");
            }
            result
        })
    }
}

/// Map non-success status codes to the matching `Error` variant.
fn check_status(response: &HttpResponse) -> Result<()> {
    match response.status {
        200..=299 => Ok(()),
        401 | 403 => Err(Error::Authentication("Invalid API key".to_string())),
        404 => Err(Error::NotFound("Resource not found".to_string())),
        429 => Err(Error::RateLimit("Rate limit exceeded".to_string())),
        status @ 500..=599 => Err(Error::Response(format!("Server error: HTTP {status}"))),
        status => Err(Error::Response(format!("HTTP {status}: {}", response.body))),
    }
}

fn format_seconds(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        duration.as_secs_f64().to_string()
    }
}
