//! Client for the job runner's request/response endpoints.
//!
//! Streaming is not handled here; see [`crate::session`].

pub mod endpoints;

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{NetworkError, SubmissionError};
use crate::models::{JobRequest, SubmitOutcome, SubmitResponse};
use crate::traits::{Headers, HttpClient, Response};

/// Server-side configuration properties, keyed by property name.
pub type ConfigProperties = BTreeMap<String, Value>;

#[derive(Debug, Deserialize)]
struct VersionBody {
    version: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

/// HTTP client for job submission and static metadata.
pub struct RagClient<C: HttpClient> {
    base_url: String,
    http: Arc<C>,
}

impl<C: HttpClient> Clone for RagClient<C> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: Arc::clone(&self.http),
        }
    }
}

impl<C: HttpClient> RagClient<C> {
    pub fn new(base_url: impl Into<String>, http: Arc<C>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> Arc<C> {
        Arc::clone(&self.http)
    }

    /// Submit a job.
    ///
    /// Streaming modes yield a job id; raw RAG yields the answer directly.
    pub async fn submit_job(&self, request: &JobRequest) -> Result<SubmitOutcome, SubmissionError> {
        let url = endpoints::job(&self.base_url);
        let body = serde_json::to_string(request)
            .map_err(|e| SubmissionError::InvalidBody(e.to_string()))?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        debug!(mode = %request.mode(), "Submitting job");
        let response = self.http.post(&url, &body, &headers).await?;
        if !response.is_success() {
            return Err(SubmissionError::Rejected {
                status: response.status,
                body: response.text(),
            });
        }

        let parsed: SubmitResponse = response
            .json()
            .map_err(|e| SubmissionError::InvalidBody(e.to_string()))?;
        let outcome = parsed.into_outcome(request.mode())?;
        if let SubmitOutcome::Streaming { job_id } = &outcome {
            info!(job_id = %job_id, "Job accepted");
        }
        Ok(outcome)
    }

    /// `GET /api/config/properties`
    pub async fn fetch_config(&self) -> Result<ConfigProperties, NetworkError> {
        let url = endpoints::config_properties(&self.base_url);
        let response = self.get_ok(&url).await?;
        decode(&response)
    }

    /// `GET /api/version`
    pub async fn fetch_version(&self) -> Result<String, NetworkError> {
        let url = endpoints::version(&self.base_url);
        let response = self.get_ok(&url).await?;
        decode::<VersionBody>(&response).map(|body| body.version)
    }

    /// `GET /api/status`
    pub async fn fetch_status(&self) -> Result<String, NetworkError> {
        let url = endpoints::status(&self.base_url);
        let response = self.get_ok(&url).await?;
        decode::<StatusBody>(&response).map(|body| body.status)
    }

    async fn get_ok(&self, url: &str) -> Result<Response, NetworkError> {
        let response = self
            .http
            .get(url, &Headers::new())
            .await
            .map_err(|e| NetworkError::from_http(e, url))?;
        if !response.is_success() {
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message: response.text(),
            });
        }
        Ok(response)
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: &Response) -> Result<T, NetworkError> {
    response.json().map_err(|e| NetworkError::InvalidResponse {
        message: e.to_string(),
    })
}
