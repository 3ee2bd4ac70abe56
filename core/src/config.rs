//! Connection settings and the process-wide default configuration.
//!
//! # Design
//! `Configuration` is a plain owned value so a `Client` can be built from an
//! explicit instance. The resource operations (`Database::all`, `Case::find`,
//! ...) read the process-wide instance behind [`global`], which is created on
//! first access and lives for the rest of the process. `CANLII_API_KEY` is
//! read once, when that instance (or any `Configuration::new()`) is built.

use std::fmt;
use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.canlii.org/v1";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const API_KEY_ENV: &str = "CANLII_API_KEY";

/// Connection parameters used for every request.
#[derive(Clone)]
pub struct Configuration {
    pub base_url: String,
    pub api_key: Option<String>,
    pub language: String,
    /// `None` disables the timeout entirely.
    pub timeout: Option<Duration>,
    /// Dispatcher the client emits its `tracing` events into.
    pub logger: Dispatch,
}

impl Configuration {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: std::env::var(API_KEY_ENV).ok(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            logger: stdout_logger(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    /// Fails unless an API key is set and is not blank.
    pub fn validate(&self) -> Result<()> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(Error::Validation("API key is required".to_string())),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn redact(key: &Option<String>) -> &'static str {
    match key {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

/// Default logger: human-readable lines on stdout, filtered by `RUST_LOG`.
fn stdout_logger() -> Dispatch {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .finish();
    Dispatch::new(subscriber)
}

static GLOBAL: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::new()));

/// The process-wide configuration. Every call returns the same instance.
pub fn global() -> &'static RwLock<Configuration> {
    &GLOBAL
}

fn read_global() -> RwLockReadGuard<'static, Configuration> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner)
}

/// Snapshot of the process-wide configuration.
pub fn configuration() -> Configuration {
    read_global().clone()
}

pub(crate) fn current_language() -> String {
    read_global().language.clone()
}

/// Mutate the process-wide configuration in place.
///
/// ```no_run
/// canlii_core::configure(|config| {
///     config.api_key = Some("my-key".to_string());
///     config.language = "fr".to_string();
/// });
/// ```
pub fn configure<F>(mutator: F)
where
    F: FnOnce(&mut Configuration),
{
    let mut config = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    mutator(&mut config);
}

/// Run `body` with the process-wide language set to `language`.
///
/// The previous language is restored when `body` returns, including when it
/// unwinds.
pub fn with_language<T>(language: impl Into<String>, body: impl FnOnce() -> T) -> T {
    let mut language = language.into();
    configure(|config| std::mem::swap(&mut config.language, &mut language));
    let _restore = LanguageRestore {
        previous: Some(language),
    };
    body()
}

struct LanguageRestore {
    previous: Option<String>,
}

impl Drop for LanguageRestore {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            configure(|config| config.language = previous);
        }
    }
}
