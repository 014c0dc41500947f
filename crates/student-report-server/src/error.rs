//! Per-request failures and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use student_report_core::{ApiError, RenderError};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid URL format. Expected: /api/v1/students/{{id}}/report")]
    InvalidPath,

    #[error("Invalid student ID")]
    InvalidStudentId,

    #[error("Failed to fetch student data: {0}")]
    Fetch(#[source] ApiError),

    #[error("Failed to generate PDF: {0}")]
    Render(#[from] RenderError),

    /// Rendering the built-in sample report failed
    #[error("Failed to generate test PDF: {0}")]
    TestRender(#[source] RenderError),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        if err.is_client_error() {
            AppError::InvalidStudentId
        } else {
            AppError::Fetch(err)
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidPath | AppError::InvalidStudentId => StatusCode::BAD_REQUEST,
            AppError::Fetch(_) | AppError::Render(_) | AppError::TestRender(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "Rejected request");
        }
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        assert_eq!(AppError::InvalidPath.status_code(), StatusCode::BAD_REQUEST);

        let err: AppError = ApiError::InvalidId("abc".into()).into();
        assert!(matches!(err, AppError::InvalidStudentId));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid student ID");
    }

    #[test]
    fn test_upstream_errors_map_to_server_error() {
        for api_err in [
            ApiError::Config("AUTH_EMAIL and AUTH_PASSWORD must be set in environment".into()),
            ApiError::Auth {
                status: None,
                message: "login failed".into(),
            },
            ApiError::UpstreamRejected("Student not found".into()),
        ] {
            let cause = api_err.to_string();
            let err: AppError = api_err.into();
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            let message = err.to_string();
            assert!(message.starts_with("Failed to fetch student data: "));
            assert!(message.ends_with(&cause));
        }
    }

    #[test]
    fn test_render_error_message() {
        let err: AppError = RenderError::Overflow {
            height_mm: 300.0,
            limit_mm: 287.0,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Failed to generate PDF: "));

        let err = AppError::TestRender(RenderError::Overflow {
            height_mm: 300.0,
            limit_mm: 287.0,
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Failed to generate test PDF: "));
    }
}
