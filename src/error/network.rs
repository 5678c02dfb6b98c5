//! Network-related error types for the request/response endpoints.

use thiserror::Error;

use crate::traits::HttpError;

/// Failures of the plain request/response endpoints (config, version, status).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Connection failed to '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("{operation} timed out")]
    Timeout { operation: String },

    #[error("HTTP {status} error: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Network error: {message}")]
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } | NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::InvalidResponse { .. } | NetworkError::Other { .. } => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the backend.".to_string()
            }
            NetworkError::Timeout { operation } => {
                format!("The {} request timed out.", operation)
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                404 => "The requested resource was not found.".to_string(),
                500..=599 => "The backend is experiencing issues.".to_string(),
                _ => format!("The backend returned an error (HTTP {}).", status),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the backend.".to_string()
            }
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }

    /// Classify a transport-level failure for the given request.
    pub fn from_http(err: HttpError, url: &str) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
                url: url.to_string(),
                message,
            },
            HttpError::Timeout(_) => NetworkError::Timeout {
                operation: url.to_string(),
            },
            HttpError::ServerError { status, message } => {
                NetworkError::HttpStatus { status, message }
            }
            other => NetworkError::Other {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let err = NetworkError::HttpStatus {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.is_retryable());

        let err = NetworkError::HttpStatus {
            status: 404,
            message: "missing".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(err.user_message().contains("not found"));
    }

    #[test]
    fn test_from_http_connection_failed() {
        let err = NetworkError::from_http(
            HttpError::ConnectionFailed("refused".to_string()),
            "http://localhost:1/api/version",
        );
        assert_eq!(
            err,
            NetworkError::ConnectionFailed {
                url: "http://localhost:1/api/version".to_string(),
                message: "refused".to_string(),
            }
        );
        assert_eq!(err.error_code(), "E_NET_CONN");
    }

    #[test]
    fn test_from_http_server_error() {
        let err = NetworkError::from_http(
            HttpError::ServerError {
                status: 500,
                message: "boom".to_string(),
            },
            "/api/config/properties",
        );
        assert!(matches!(err, NetworkError::HttpStatus { status: 500, .. }));
        assert_eq!(err.to_string(), "HTTP 500 error: boom");
    }
}
