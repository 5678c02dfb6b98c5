//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FetchTransport`] - Job stream read as a chunked HTTP body
//! - [`EventSourceTransport`] - Job stream read with an SSE client
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses
//! - [`mock::MockTransport`] - Scripted job streams

pub mod eventsource;
pub mod fetch;
pub mod mock;
pub mod reqwest_http;

use std::sync::Arc;

pub use eventsource::EventSourceTransport;
pub use fetch::{payload_lines, FetchTransport};
pub use reqwest_http::ReqwestHttpClient;

use crate::config::{ClientConfig, TransportKind};
use crate::traits::{HttpClient, JobTransport};

/// Build the job transport selected in `config`.
pub fn transport_for<C: HttpClient + 'static>(
    config: &ClientConfig,
    http: Arc<C>,
) -> Arc<dyn JobTransport> {
    match config.transport {
        TransportKind::Fetch => Arc::new(FetchTransport::new(http, config.base_url.clone())),
        TransportKind::EventSource => Arc::new(EventSourceTransport::new(config.base_url.clone())),
    }
}
