use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::{FilterError, LoadError};
use crate::pipeline::PipelineError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Template error: {0}")]
    Template(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Load(e) => AppError::Load(e),
            PipelineError::Filter(e) => AppError::Filter(e),
            PipelineError::Render(e) => AppError::Template(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Load(e) => (StatusCode::UNPROCESSABLE_ENTITY, "LOAD_ERROR", e.to_string()),
            AppError::Filter(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "FILTER_ERROR",
                e.to_string(),
            ),
            AppError::Template(RenderError::Io { .. }) => {
                tracing::error!("Template I/O error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Template(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "TEMPLATE_ERROR",
                e.to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request() {
        let response = AppError::Validation("document cannot be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_filter_error_is_unprocessable() {
        let err = FilterError::Structure {
            path: "jobs.0".to_string(),
            found: "string".to_string(),
        };
        let response = AppError::from(PipelineError::Filter(err)).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_internal_hides_details() {
        let response = AppError::Internal(anyhow::anyhow!("worker panicked")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
