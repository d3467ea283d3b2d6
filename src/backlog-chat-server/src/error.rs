//! Error types for the relay server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use backlog_chat::RenderError;
use serde::Serialize;
use thiserror::Error;

use crate::delivery::DeliveryError;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The webhook could not be rendered.
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    /// The chat API could not be reached.
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Render(_) => "render_error",
            Self::Delivery(_) => "delivery_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Result type for the relay server.
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::BadRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Render(RenderError::malformed("create_issue", "missing field")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::BadRequest("x".into()).error_code(), "bad_request");
        assert_eq!(
            AppError::Render(RenderError::unregistered(8)).error_code(),
            "render_error"
        );
    }
}
