//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, streaming GET)
//! - [`JobTransport`] - Opens the per-job event stream

pub mod http;
pub mod transport;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
pub use transport::{JobTransport, PayloadStream};
