//! Errors raised while creating a job.

use thiserror::Error;

use crate::traits::HttpError;

/// The job never obtained an identifier (or a direct answer).
///
/// Reported inline as a transcript entry; there is no session and no retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The request did not reach the backend.
    #[error("{0}")]
    Transport(HttpError),

    /// The backend answered with a non-success status.
    #[error("Backend error: {status} {body}")]
    Rejected { status: u16, body: String },

    /// The body could not be decoded.
    #[error("Invalid response from backend: {0}")]
    InvalidBody(String),

    /// A streaming mode answered without a job id.
    #[error("No jobId received from backend for streaming mode.")]
    MissingJobId,

    /// Raw RAG answered with neither `answer` nor `bubbles`.
    #[error("Backend returned an empty answer.")]
    EmptyAnswer,
}

impl SubmissionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SubmissionError::Transport(_) => "E_SUBMIT_TRANSPORT",
            SubmissionError::Rejected { .. } => "E_SUBMIT_REJECTED",
            SubmissionError::InvalidBody(_) => "E_SUBMIT_BODY",
            SubmissionError::MissingJobId => "E_SUBMIT_NO_JOB",
            SubmissionError::EmptyAnswer => "E_SUBMIT_EMPTY",
        }
    }
}

impl From<HttpError> for SubmissionError {
    fn from(err: HttpError) -> Self {
        SubmissionError::Transport(err)
    }
}
