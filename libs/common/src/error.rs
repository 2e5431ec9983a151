//! Custom error types for the common library
//!
//! This module defines the error taxonomy shared by every front-end area:
//! failures talking to the backend, configuration problems and access to
//! the persisted credential slot.

use reqwest::StatusCode;
use thiserror::Error;

/// Error returned by calls against the portfolio backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout...)
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        /// The `message` field of the JSON error body, when present
        message: Option<String>,
    },

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A request URL could not be built from the configured base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A local file could not be read for upload
    #[error("Failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// The backend's own message when it sent one, otherwise `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Whether the backend rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// A required value has no default in this build
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    /// A value is present but unusable
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Error accessing the persisted credential slot
#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("Token store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with ApiError
pub type ApiResult<T> = Result<T, ApiError>;

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_backend_message() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("Name is required".to_string()),
        };
        assert_eq!(err.user_message("Error saving collection"), "Name is required");
    }

    #[test]
    fn user_message_falls_back() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(err.user_message("Login failed"), "Login failed");

        let err = ApiError::Decode("bad json".to_string());
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn unauthorized_statuses() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            message: None,
        };
        assert!(err.is_unauthorized());

        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: None,
        };
        assert!(!err.is_unauthorized());
    }
}
