//! Mock HTTP client for testing.
//!
//! Returns canned responses by URL and records every request.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    pub url: String,
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a complete response
    Success(Response),
    /// Fail the request
    Error(HttpError),
    /// Stream these chunks, then end
    Stream(Vec<Bytes>),
    /// Stream these chunks, then fail mid-body
    StreamFailure { chunks: Vec<Bytes>, error: HttpError },
}

impl MockResponse {
    /// Complete response with a JSON body.
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        MockResponse::Success(Response::new(status, Bytes::from(body.to_string())))
    }

    /// Event stream body made of the given lines, one chunk per line.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        MockResponse::Stream(
            lines
                .into_iter()
                .map(|line| Bytes::from(format!("{}\n", line.as_ref())))
                .collect(),
        )
    }
}

/// Canned backend for tests.
///
/// A URL is answered by its exact entry, else by the longest configured
/// prefix (so `.../api/events/` covers every job), else by the default.
/// Clones share routes and recordings.
///
/// ```ignore
/// use ragchat::adapters::mock::{MockHttpClient, MockResponse};
///
/// let backend = MockHttpClient::new();
/// backend.set_response(
///     "http://localhost:8080/api/job",
///     MockResponse::json(200, serde_json::json!({"jobId": "job-1"})),
/// );
/// backend.set_response(
///     "http://localhost:8080/api/events/",
///     MockResponse::lines(["data: 42", r#"data: {"complete":true}"#]),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    inner: Arc<Mutex<Routes>>,
}

#[derive(Debug, Default)]
struct Routes {
    by_url: HashMap<String, MockResponse>,
    fallback: Option<MockResponse>,
    seen: Vec<RecordedRequest>,
}

impl Routes {
    fn route(&self, url: &str) -> Option<MockResponse> {
        self.by_url
            .get(url)
            .or_else(|| {
                self.by_url
                    .iter()
                    .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
                    .max_by_key(|(prefix, _)| prefix.len())
                    .map(|(_, response)| response)
            })
            .or(self.fallback.as_ref())
            .cloned()
    }
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn routes(&self) -> MutexGuard<'_, Routes> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer `url` (or any URL starting with it) with `response`.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.routes().by_url.insert(url.to_string(), response);
    }

    /// Answer for URLs with no route.
    pub fn set_default_response(&self, response: MockResponse) {
        self.routes().fallback = Some(response);
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.routes().seen.clone()
    }

    /// Requests whose URL starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.routes()
            .seen
            .iter()
            .filter(|r| r.url.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear_requests(&self) {
        self.routes().seen.clear();
    }

    /// Record the request and look up its answer.
    fn exchange(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
        body: Option<&str>,
    ) -> Result<MockResponse, HttpError> {
        let mut routes = self.routes();
        routes.seen.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.map(str::to_string),
        });
        routes
            .route(url)
            .ok_or_else(|| HttpError::Other(format!("No mock response for URL: {}", url)))
    }

    fn complete(response: MockResponse) -> Result<Response, HttpError> {
        match response {
            MockResponse::Success(response) => Ok(response),
            MockResponse::Error(err) => Err(err),
            MockResponse::Stream(_) | MockResponse::StreamFailure { .. } => Err(
                HttpError::Other("Stream response on non-stream request".to_string()),
            ),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        Self::complete(self.exchange("GET", url, headers, None)?)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        Self::complete(self.exchange("POST", url, headers, Some(body))?)
    }

    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        let chunks: Vec<Result<Bytes, HttpError>> = match self.exchange("GET", url, headers, None)? {
            MockResponse::Stream(chunks) => chunks.into_iter().map(Ok).collect(),
            MockResponse::StreamFailure { chunks, error } => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(error)))
                .collect(),
            MockResponse::Success(response) if !response.is_success() => {
                return Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text(),
                });
            }
            MockResponse::Success(response) => vec![Ok(response.body)],
            MockResponse::Error(err) => return Err(err),
        };
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
