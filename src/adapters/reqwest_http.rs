//! Production [`HttpClient`] on reqwest.
//!
//! Only a connect timeout is configured. The event stream stays open for
//! as long as the job runs and its deadline belongs to the stream session,
//! so a whole-request timeout would cut healthy streams short.

use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;
use tracing::debug;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose connection attempts give up after `timeout`.
    pub fn with_connect_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(classify)?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> Result<reqwest::Response, HttpError> {
        for (name, value) in headers {
            request = request.header(name, value);
        }
        request.send().await.map_err(classify)
    }

    async fn read(response: reqwest::Response) -> Result<Response, HttpError> {
        let status = response.status().as_u16();
        let headers = header_map(response.headers());
        let body = response.bytes().await.map_err(classify)?;
        Ok(Response::with_headers(status, headers, body))
    }
}

/// Map a reqwest failure onto [`HttpError`].
fn classify(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else if err.is_connect() {
        HttpError::ConnectionFailed(err.to_string())
    } else if err.is_builder() {
        HttpError::InvalidUrl(err.to_string())
    } else if err.is_body() || err.is_decode() {
        HttpError::Io(err.to_string())
    } else {
        HttpError::Other(err.to_string())
    }
}

/// Headers with non-UTF-8 values dropped.
fn header_map(headers: &reqwest::header::HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect()
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        debug!("GET {}", url);
        let response = self.send(self.client.get(url), headers).await?;
        Self::read(response).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        debug!("POST {}", url);
        let response = self
            .send(self.client.post(url).body(body.to_string()), headers)
            .await?;
        Self::read(response).await
    }

    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        debug!("GET {} (stream)", url);
        let response = self.send(self.client.get(url), headers).await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::read(response).await.map(|r| r.text()).unwrap_or_default();
            return Err(HttpError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(classify))))
    }
}
