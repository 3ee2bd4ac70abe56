//! Default blocking transport backed by `ureq`.

use std::io;

use tracing::warn;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Upper bound on a response body read into memory.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// `Transport` that performs real HTTP calls with ureq.
///
/// Status-code-as-error is disabled so 4xx/5xx responses come back as data
/// and the client does the status interpretation. Redirects are not
/// followed: a 3xx is returned as-is, so each call is one round trip. A
/// fresh agent is built per request so the request's timeout applies to the
/// whole call.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .timeout_global(request.timeout)
            .build()
            .new_agent();

        let mut builder = agent.get(&request.url);
        for (key, value) in &request.query {
            builder = builder.query(key, value);
        }

        let mut response = builder.call().map_err(map_ureq_error)?;
        let status = response.status().as_u16();

        // Once a status has arrived it decides the outcome; a body that
        // cannot be read is treated as empty unless the read timed out.
        let body = match response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()
        {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => match map_ureq_error(err) {
                TransportError::Timeout => return Err(TransportError::Timeout),
                TransportError::Other(msg) => {
                    warn!(status, error = %msg, "discarding unreadable response body");
                    String::new()
                }
            },
        };

        Ok(HttpResponse { status, body })
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => TransportError::Timeout,
        other => TransportError::Other(other.to_string()),
    }
}
