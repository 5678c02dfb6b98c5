//! Conversation controller.
//!
//! Owns the transcript across jobs and at most one stream session at a
//! time. A send submits the job, then either starts a session (streaming
//! modes) or appends the direct answer. Retry replaces the session of a
//! timed-out or interrupted job with a fresh one for the same job id.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::adapters::{transport_for, ReqwestHttpClient};
use crate::client::RagClient;
use crate::config::ClientConfig;
use crate::error::{ChatError, ChatResult, SubmissionError};
use crate::models::{Job, JobRequest, ResponseMode, SubmitOutcome, TranscriptEntry};
use crate::session::{SessionHandle, StreamSession};
use crate::state::{retry, JobSessionState};
use crate::traits::{HttpClient, JobTransport};
use crate::view::{self, AppMetadata, TranscriptView};

/// Result of [`Conversation::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank message, nothing was sent
    Ignored,
    /// A stream session was started for this job
    Streaming { job_id: String },
    /// The backend answered inline; `entries` were appended
    Answered { entries: usize },
    /// The job could not be created; an inline error entry was appended
    SubmissionFailed(SubmissionError),
}

/// One user's conversation with the backend.
pub struct Conversation<C: HttpClient> {
    client: RagClient<C>,
    transport: Arc<dyn JobTransport>,
    stream_timeout: Duration,
    mode: ResponseMode,
    /// Transcript as of the last settled job
    transcript: Vec<TranscriptEntry>,
    /// The accepted streaming job, kept across retries
    job: Option<Job>,
    session: Option<SessionHandle>,
    metadata: AppMetadata,
}

impl Conversation<ReqwestHttpClient> {
    /// Build a conversation against a live backend.
    pub fn connect(config: &ClientConfig) -> ChatResult<Self> {
        let http = ReqwestHttpClient::with_connect_timeout(config.connect_timeout)
            .map_err(|e| ChatError::Configuration(e.to_string()))?;
        let http = Arc::new(http);
        let transport = transport_for(config, Arc::clone(&http));
        let client = RagClient::new(config.base_url.clone(), http);
        info!(
            base_url = %config.base_url,
            transport = %config.transport,
            mode = %config.response_mode,
            "Conversation ready"
        );
        Ok(Self::new(client, transport, config))
    }
}

impl<C: HttpClient> Conversation<C> {
    pub fn new(client: RagClient<C>, transport: Arc<dyn JobTransport>, config: &ClientConfig) -> Self {
        Self {
            client,
            transport,
            stream_timeout: config.stream_timeout,
            mode: config.response_mode,
            transcript: Vec::new(),
            job: None,
            session: None,
            metadata: AppMetadata::default(),
        }
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ResponseMode) {
        self.mode = mode;
    }

    pub fn client(&self) -> &RagClient<C> {
        &self.client
    }

    pub fn metadata(&self) -> &AppMetadata {
        &self.metadata
    }

    /// The job the current session streams, if any.
    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    /// Whether a session exists that has not settled yet.
    pub fn is_busy(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|handle| !handle.current().is_settled())
    }

    /// Latest state of the current (or last) job, if it streamed.
    pub fn job_state(&self) -> Option<JobSessionState> {
        self.session.as_ref().map(SessionHandle::current)
    }

    /// The transcript including whatever the running session added.
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        match &self.session {
            Some(handle) => handle.current().transcript,
            None => self.transcript.clone(),
        }
    }

    /// Snapshots of the running session.
    pub fn subscribe(&self) -> Option<watch::Receiver<JobSessionState>> {
        self.session.as_ref().map(SessionHandle::snapshots)
    }

    pub fn view(&self) -> TranscriptView {
        match &self.session {
            Some(handle) => view::project(&handle.current(), &self.metadata),
            None => view::project_transcript(&self.transcript, false, &self.metadata),
        }
    }

    /// Fetch config, version and status concurrently.
    ///
    /// Failures are logged and leave the corresponding field empty.
    pub async fn load_metadata(&mut self) -> &AppMetadata {
        let (config, version, status) = tokio::join!(
            self.client.fetch_config(),
            self.client.fetch_version(),
            self.client.fetch_status(),
        );

        self.metadata.config = config
            .map_err(|e| warn!(code = e.error_code(), "Failed to fetch config: {}", e))
            .ok();
        self.metadata.version = version
            .map_err(|e| warn!(code = e.error_code(), "Failed to fetch version: {}", e))
            .ok();
        self.metadata.status = status
            .map_err(|e| warn!(code = e.error_code(), "Failed to fetch status: {}", e))
            .ok();
        &self.metadata
    }

    /// Submit `message` in the current response mode.
    pub async fn send(&mut self, message: &str) -> ChatResult<SendOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        if self.is_busy() {
            return Err(ChatError::JobInProgress);
        }

        self.absorb_session();
        self.job = None;
        self.transcript.push(TranscriptEntry::user(message));

        let request = JobRequest::new(message, self.mode);
        match self.client.submit_job(&request).await {
            Ok(SubmitOutcome::Streaming { job_id }) => {
                let job = Job::new(job_id.clone(), &request);
                info!(job_id = %job.id(), mode = %job.mode(), "Job accepted");
                self.job = Some(job);
                let state = JobSessionState::new(job_id.clone(), self.transcript.clone());
                self.start_session(state);
                Ok(SendOutcome::Streaming { job_id })
            }
            Ok(SubmitOutcome::Direct(answer)) => {
                debug!(source = ?answer.source, bubbles = answer.bubbles.len(), "Direct answer");
                let entries = answer.bubbles.len();
                self.transcript
                    .extend(answer.bubbles.into_iter().map(TranscriptEntry::assistant));
                Ok(SendOutcome::Answered { entries })
            }
            Err(err) => {
                warn!(code = err.error_code(), "Job submission failed: {}", err);
                self.transcript
                    .push(TranscriptEntry::submission_error(err.to_string()));
                Ok(SendOutcome::SubmissionFailed(err))
            }
        }
    }

    /// Reconnect to the current job after a timeout or interruption.
    pub fn retry(&mut self) -> ChatResult<String> {
        let job = self.job.as_ref().ok_or(ChatError::NoActiveJob)?;
        let handle = self.session.as_ref().ok_or(ChatError::NoActiveJob)?;
        let current = handle.current();
        let next = retry(&current).ok_or(ChatError::RetryUnavailable {
            phase: current.phase,
        })?;

        info!(
            job_id = %job.id(),
            mode = %job.mode(),
            created_at = %job.created_at(),
            attempt = next.retry_count,
            "Retrying job stream"
        );
        let job_id = job.id().to_string();
        self.start_session(next);
        Ok(job_id)
    }

    /// Wait until the current session settles.
    pub async fn settled(&self) -> Option<JobSessionState> {
        match &self.session {
            Some(handle) => Some(handle.settled().await),
            None => None,
        }
    }

    /// Stop the running session, keeping its transcript.
    pub fn cancel(&mut self) {
        self.absorb_session();
    }

    fn start_session(&mut self, state: JobSessionState) {
        if let Some(mut previous) = self.session.take() {
            previous.dispose();
        }
        self.session = Some(StreamSession::spawn(
            Arc::clone(&self.transport),
            state,
            self.stream_timeout,
        ));
    }

    /// Fold the current session's transcript back into the conversation
    /// and dispose the session.
    fn absorb_session(&mut self) {
        if let Some(mut handle) = self.session.take() {
            handle.dispose();
            self.transcript = handle.current().transcript;
        }
    }
}
