//! HTTP seam between the backend clients and the network.
//!
//! The job runner needs three things from HTTP: a JSON POST to create a
//! job, plain GETs for metadata, and a GET whose body is read while the
//! job runs. Production uses reqwest; tests use the mock in
//! `adapters::mock`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use thiserror::Error;

pub type Headers = HashMap<String, String>;

/// Body of a streaming GET, chunk by chunk as the network delivers it.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// A fully read response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self::with_headers(status, Headers::new(), body)
    }

    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text; invalid UTF-8 is replaced rather than rejected, since
    /// this only feeds error messages and logs.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Transport-level HTTP failures.
///
/// Callers map these into [`NetworkError`](crate::error::NetworkError),
/// [`StreamError`](crate::error::StreamError) or
/// [`SubmissionError`](crate::error::SubmissionError) depending on which
/// request failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Non-success status on a streaming GET
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    /// Reading the body failed part way
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Other(String),
}

/// HTTP operations used by [`RagClient`](crate::client::RagClient) and
/// [`FetchTransport`](crate::adapters::FetchTransport).
///
/// `get` and `post` return non-success statuses as ordinary responses;
/// only `get_stream` turns them into [`HttpError::ServerError`], before any
/// byte is yielded.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// GET whose body stays open while the job runs.
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(Response::new(200, Bytes::new()).is_success());
        assert!(Response::new(204, Bytes::new()).is_success());
        assert!(!Response::new(302, Bytes::new()).is_success());
        assert!(!Response::new(404, Bytes::new()).is_success());
    }

    #[test]
    fn test_json_job_id() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        #[serde(rename_all = "camelCase")]
        struct Created {
            job_id: String,
        }

        let response = Response::new(200, Bytes::from(r#"{"jobId":"job-7"}"#));
        let created: Created = response.json().unwrap();
        assert_eq!(created.job_id, "job-7");
    }

    #[test]
    fn test_text_is_lossy() {
        let response = Response::new(500, Bytes::from_static(b"Internal \xff Error"));
        assert_eq!(response.text(), "Internal \u{fffd} Error");
    }

    #[test]
    fn test_server_error_display() {
        let err = HttpError::ServerError {
            status: 404,
            message: "Job not found".to_string(),
        };
        assert_eq!(err.to_string(), "Server error (404): Job not found");
    }
}
