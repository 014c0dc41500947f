use reqwest::StatusCode;
use thiserror::Error;

use crate::utils::format::truncate_body;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {message}")]
    Auth {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("API request failed: {0}")]
    UpstreamRejected(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid student ID: {0:?}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        truncate_body(body, MAX_ERROR_BODY_LENGTH)
    }

    /// Login rejected by the upstream, keeping the status and body for diagnostics.
    pub fn login_rejected(status: StatusCode, body: &str) -> Self {
        ApiError::Auth {
            status: Some(status),
            message: format!(
                "login failed with status {}: {}",
                status.as_u16(),
                Self::truncate_body(body)
            ),
        }
    }

    /// Non-2xx response from a record endpoint.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::UpstreamStatus {
            status,
            body: Self::truncate_body(body),
        }
    }

    /// Errors caused by the caller's input rather than the upstream or the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::InvalidId(_))
    }
}
