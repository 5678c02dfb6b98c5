//! Chunked-fetch job transport.
//!
//! Reads `GET /api/events/{jobId}` as a plain byte stream and splits it
//! into lines, keeping only the lines that carry a payload.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

use crate::client::endpoints;
use crate::error::StreamError;
use crate::sse::{classify_line, LineSplitter, SseLine};
use crate::traits::{ByteStream, Headers, HttpClient, JobTransport, PayloadStream};

/// Job transport over any [`HttpClient`].
pub struct FetchTransport<C: HttpClient> {
    http: Arc<C>,
    base_url: String,
}

impl<C: HttpClient> FetchTransport<C> {
    pub fn new(http: Arc<C>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClient + 'static> JobTransport for FetchTransport<C> {
    async fn open(&self, job_id: &str) -> Result<PayloadStream, StreamError> {
        let url = endpoints::events(&self.base_url, job_id);
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        let bytes = self
            .http
            .get_stream(&url, &headers)
            .await
            .map_err(StreamError::open_failed)?;
        info!("Opened event stream {}", url);

        Ok(payload_lines(bytes))
    }

    fn name(&self) -> &'static str {
        "fetch"
    }
}

struct LineState {
    bytes: ByteStream,
    splitter: LineSplitter,
    ready: VecDeque<String>,
    done: bool,
}

/// Turn a response body into payload lines.
///
/// Blank separators, comments and `event:`/`id:`/`retry:` fields are
/// dropped. A body error ends the stream after being yielded once.
pub fn payload_lines(bytes: ByteStream) -> PayloadStream {
    let state = LineState {
        bytes,
        splitter: LineSplitter::new(),
        ready: VecDeque::new(),
        done: false,
    };

    let lines = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.ready.pop_front() {
                return Some((Ok(line), state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.splitter.push(&chunk);
                    state.ready.extend(lines);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(StreamError::connection_lost(e)), state));
                }
                None => {
                    state.done = true;
                    if let Some(tail) = state.splitter.finish() {
                        state.ready.push_back(tail);
                    }
                }
            }
        }
    });

    Box::pin(lines.filter_map(|item| async move {
        match item {
            Ok(line) => match classify_line(&line) {
                SseLine::Payload(payload) => Some(Ok(payload)),
                other => {
                    debug!("Dropping framing line: {:?}", other);
                    None
                }
            },
            Err(e) => Some(Err(e)),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::traits::HttpError;
    use bytes::Bytes;

    const BASE: &str = "http://localhost:8080";

    async fn collect(transport: &FetchTransport<MockHttpClient>) -> Vec<Result<String, StreamError>> {
        transport.open("job-1").await.unwrap().collect().await
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let http = MockHttpClient::new();
        http.set_response(
            "http://localhost:8080/api/events/job-1",
            MockResponse::Stream(vec![
                Bytes::from("data:{\"statusMessage\":\"retr"),
                Bytes::from("ieving\"}\n\ndata: The ans"),
                Bytes::from("wer\r\n: keepalive\nevent: message\ndata: tail"),
            ]),
        );
        let transport = FetchTransport::new(Arc::new(http.clone()), BASE);

        let items = collect(&transport).await;
        assert_eq!(
            items,
            vec![
                Ok(r#"data:{"statusMessage":"retrieving"}"#.to_string()),
                Ok("data: The answer".to_string()),
                Ok("data: tail".to_string()),
            ]
        );

        let requests = http.get_requests();
        assert_eq!(
            requests[0].headers.get("Accept").map(String::as_str),
            Some("text/event-stream")
        );
    }

    #[tokio::test]
    async fn test_open_failure() {
        let http = MockHttpClient::new();
        http.set_response(
            "http://localhost:8080/api/events/",
            MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
        );
        let transport = FetchTransport::new(Arc::new(http), BASE);

        let err = transport.open("job-1").await.err().unwrap();
        assert!(matches!(err, StreamError::OpenFailed { .. }));
    }

    #[tokio::test]
    async fn test_body_error_after_lines() {
        let http = MockHttpClient::new();
        http.set_response(
            "http://localhost:8080/api/events/",
            MockResponse::StreamFailure {
                chunks: vec![Bytes::from("data: hi\n")],
                error: HttpError::Io("reset".to_string()),
            },
        );
        let transport = FetchTransport::new(Arc::new(http), BASE);

        let items = collect(&transport).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok("data: hi".to_string()));
        assert!(matches!(items[1], Err(StreamError::ConnectionLost { .. })));
    }
}
