//! Stream-side error types.
//!
//! None of these ever reach the caller of a stream session; the session
//! turns them into phase transitions.

use thiserror::Error;

use crate::traits::HttpError;

/// Failures of the job event stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The stream endpoint could not be opened.
    #[error("Failed to open event stream: {message}")]
    OpenFailed { message: String },

    /// The transport dropped mid-stream.
    #[error("Stream connection lost: {message}")]
    ConnectionLost { message: String },

    /// No terminal frame before the deadline.
    #[error("Stream timeout after {duration_secs} seconds")]
    Timeout { duration_secs: u64 },

    /// A payload looked structured but could not be decoded.
    #[error("Malformed payload: {raw}")]
    MalformedPayload { raw: String },

    /// The server ended the stream.
    #[error("Server closed stream")]
    ServerClosed,
}

impl StreamError {
    /// Check if reconnecting to the same job may help.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::OpenFailed { .. }
                | StreamError::ConnectionLost { .. }
                | StreamError::Timeout { .. }
                | StreamError::ServerClosed
        )
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::OpenFailed { .. } => "E_STREAM_OPEN",
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::Timeout { .. } => "E_STREAM_TIMEOUT",
            StreamError::MalformedPayload { .. } => "E_STREAM_MALFORMED",
            StreamError::ServerClosed => "E_STREAM_CLOSED",
        }
    }

    /// Map a failure to open the stream request.
    pub fn open_failed(err: HttpError) -> Self {
        StreamError::OpenFailed {
            message: err.to_string(),
        }
    }

    /// Map a failure while reading the stream body.
    pub fn connection_lost(err: HttpError) -> Self {
        StreamError::ConnectionLost {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_retryable() {
        assert!(StreamError::ServerClosed.is_retryable());
        assert!(StreamError::Timeout { duration_secs: 185 }.is_retryable());
        assert!(!StreamError::MalformedPayload {
            raw: "{".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_stream_error_display() {
        let err = StreamError::open_failed(HttpError::ServerError {
            status: 404,
            message: "Job not found".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to open event stream: Server error (404): Job not found"
        );
        assert_eq!(err.error_code(), "E_STREAM_OPEN");

        let err = StreamError::Timeout { duration_secs: 185 };
        assert_eq!(err.to_string(), "Stream timeout after 185 seconds");
    }
}
