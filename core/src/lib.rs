//! Blocking client for the CanLII case-law REST API.
//!
//! # Overview
//! Lists case databases, browses cases within a database, and fetches case
//! details. Every call is a single GET with the configured API key and
//! language, and every failure is a typed [`Error`].
//!
//! ```no_run
//! use canlii_core::{configure, BrowseOptions, Case, Database};
//!
//! configure(|config| config.api_key = Some("my-key".to_string()));
//!
//! for database in Database::all()? {
//!     println!("{:?}", database.name);
//! }
//! let recent = Case::browse("csc-scc", &BrowseOptions::default().limit(5))?;
//! let detail = Case::find("csc-scc", "2025scc21")?;
//! # Ok::<(), canlii_core::Error>(())
//! ```
//!
//! # Design
//! - `Client` splits each call into `build_request` and `parse_response`
//!   around a pluggable `Transport`; `UreqTransport` is the default.
//! - Resource operations read the process-wide `Configuration` and resolve
//!   their client through `context::with_client`, which lets a caller swap
//!   in another `ApiClient` for a scoped unit of work on the current thread.
//! - Logging goes through `tracing` into the configuration's dispatcher.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
mod resources;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::{ApiClient, Client, QueryParams};
pub use config::{configuration, configure, with_language, Configuration};
pub use context::{active_client, with_client};
pub use error::{Error, ErrorKind, Result, TransportError};
pub use http::{HttpRequest, HttpResponse, Transport};
pub use transport::UreqTransport;
pub use types::{BrowseOptions, Case, Database};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
