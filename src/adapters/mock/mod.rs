//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`MockTransport`] - Job transport driven by scripts

pub mod http;
pub mod transport;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use transport::{MockScript, MockStep, MockTransport};
