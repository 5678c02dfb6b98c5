//! Unified error type for the chat client.

use thiserror::Error;

use super::category::ErrorCategory;
use super::network::NetworkError;
use super::stream::StreamError;
use super::submission::SubmissionError;
use crate::state::Phase;

/// Errors surfaced by the conversation controller and the startup path.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// A job is running or being submitted.
    #[error("A job is already in progress")]
    JobInProgress,

    /// Retry requested from a phase that does not allow it.
    #[error("Retry is not available in phase {phase}")]
    RetryUnavailable { phase: Phase },

    #[error("No job has been started")]
    NoActiveJob,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ChatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Network(err) => match err {
                NetworkError::HttpStatus { status, .. } if *status >= 500 => {
                    ErrorCategory::Server
                }
                NetworkError::InvalidResponse { .. } => ErrorCategory::Client,
                _ => ErrorCategory::Network,
            },
            ChatError::Stream(err) => match err {
                StreamError::MalformedPayload { .. } => ErrorCategory::Client,
                StreamError::ServerClosed => ErrorCategory::Server,
                _ => ErrorCategory::Network,
            },
            ChatError::Submission(err) => match err {
                SubmissionError::Transport(_) => ErrorCategory::Network,
                SubmissionError::Rejected { .. } => ErrorCategory::Server,
                SubmissionError::InvalidBody(_)
                | SubmissionError::MissingJobId
                | SubmissionError::EmptyAnswer => ErrorCategory::Client,
            },
            ChatError::JobInProgress
            | ChatError::RetryUnavailable { .. }
            | ChatError::NoActiveJob => ErrorCategory::User,
            ChatError::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Network(err) => err.is_retryable(),
            ChatError::Stream(err) => err.is_retryable(),
            _ => self.category().is_retryable(),
        }
    }

    /// Message suitable for the terminal.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Network(err) => err.user_message(),
            ChatError::JobInProgress => {
                "Please wait for the current answer to finish.".to_string()
            }
            ChatError::RetryUnavailable { .. } => {
                "Retry is only available after a timeout or a lost connection.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Network(err) => err.error_code(),
            ChatError::Stream(err) => err.error_code(),
            ChatError::Submission(err) => err.error_code(),
            ChatError::JobInProgress => "E_CHAT_BUSY",
            ChatError::RetryUnavailable { .. } => "E_CHAT_NO_RETRY",
            ChatError::NoActiveJob => "E_CHAT_NO_JOB",
            ChatError::Configuration(_) => "E_CONFIG",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}
