//! Shared test doubles for the unit tests.

use std::cell::RefCell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::client::{ApiClient, QueryParams};
use crate::config::{configure, DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_TIMEOUT};
use crate::error::{Result, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport};

static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that touch the process-wide configuration and reset it
/// to defaults with `api_key = "test_key"`.
pub(crate) fn lock_global() -> MutexGuard<'static, ()> {
    let guard = GLOBAL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    configure(|config| {
        config.base_url = DEFAULT_BASE_URL.to_string();
        config.api_key = Some("test_key".to_string());
        config.language = DEFAULT_LANGUAGE.to_string();
        config.timeout = Some(DEFAULT_TIMEOUT);
    });
    guard
}

/// Transport that answers every request with one canned outcome.
#[derive(Clone)]
pub(crate) struct StubTransport {
    outcome: std::result::Result<HttpResponse, TransportError>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl StubTransport {
    pub(crate) fn responding(status: u16, body: &str) -> Self {
        Self {
            outcome: Ok(HttpResponse::new(status, body)),
            seen: Arc::default(),
        }
    }

    pub(crate) fn failing(err: TransportError) -> Self {
        Self {
            outcome: Err(err),
            seen: Arc::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

/// `ApiClient` that returns a canned payload and records each call.
pub(crate) struct RecordingClient {
    outcome: Result<Value>,
    calls: RefCell<Vec<(String, QueryParams)>>,
}

impl RecordingClient {
    /// Client whose every answer is `{"client": name}`.
    pub(crate) fn named(name: &'static str) -> Self {
        Self::returning(Ok(serde_json::json!({ "client": name })))
    }

    pub(crate) fn returning(outcome: Result<Value>) -> Self {
        Self {
            outcome,
            calls: RefCell::default(),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, QueryParams)> {
        self.calls.borrow().clone()
    }
}

impl ApiClient for RecordingClient {
    fn get(&self, path: &str, params: &QueryParams) -> Result<Value> {
        self.calls
            .borrow_mut()
            .push((path.to_string(), params.clone()));
        self.outcome.clone()
    }
}
