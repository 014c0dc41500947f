//! HTTP route handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use student_report_core::models::{mock_student, StudentId};
use tracing::info;

use super::error::AppError;
use super::server::SharedState;

// Health check

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "pdf",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// Reports

/// Report for the built-in sample student; needs no upstream.
pub async fn test_report(State(state): State<SharedState>) -> Result<Response, AppError> {
    info!("Generating test PDF report with mock data");

    let bytes = state
        .renderer
        .render(&mock_student())
        .map_err(AppError::TestRender)?;
    info!(bytes = bytes.len(), "Generated test PDF report");

    Ok(document_response(
        state.renderer.content_type(),
        "test_student_report.pdf",
        bytes,
    ))
}

/// `GET /api/v1/students/{id}/report`
pub async fn student_report(
    State(state): State<SharedState>,
    Path(rest): Path<String>,
) -> Result<Response, AppError> {
    let raw_id = parse_report_path(&rest)?;
    let id: StudentId = raw_id.parse().map_err(|_| AppError::InvalidStudentId)?;
    info!(%id, "Generating PDF report for student");

    let student = state.client.fetch_student_by_id(id).await?;
    info!(%id, name = %student.name, "Fetched student data");

    let bytes = state.renderer.render(&student)?;
    info!(%id, bytes = bytes.len(), "Generated PDF report");

    Ok(document_response(
        state.renderer.content_type(),
        &format!("student_{}_report.pdf", id),
        bytes,
    ))
}

/// Split the part after `/api/v1/students/` into the id, requiring a trailing `/report`
fn parse_report_path(rest: &str) -> Result<&str, AppError> {
    let parts: Vec<&str> = rest.trim_start_matches('/').split('/').collect();
    match parts.as_slice() {
        [id, "report"] => Ok(*id),
        _ => Err(AppError::InvalidPath),
    }
}

fn document_response(content_type: &'static str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_path() {
        assert_eq!(parse_report_path("123/report").unwrap(), "123");
        assert_eq!(parse_report_path("/456/report").unwrap(), "456");
        // Id validation happens separately
        assert_eq!(parse_report_path("abc/report").unwrap(), "abc");

        for bad in ["123", "123/export", "123/report/extra", "123/report/", ""] {
            assert!(
                matches!(parse_report_path(bad), Err(AppError::InvalidPath)),
                "{bad:?} should be rejected"
            );
        }
    }
}
