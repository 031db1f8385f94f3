//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`. Use
//! `AppError` (or types that implement `Into<AppError>`) for errors and `?` so they become
//! `HttpAppError` and render consistently (status, body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docvault_core::validation::FieldError;
use docvault_core::AppError;
use docvault_storage::StorageError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Per-field failures, present for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from docvault-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::Internal(err.to_string()))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app_error = match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app_error)
    }
}

impl From<docvault_core::validation::ValidationErrors> for HttpAppError {
    fn from(errors: docvault_core::validation::ValidationErrors) -> Self {
        HttpAppError(AppError::Validation(errors))
    }
}

fn http_status(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn log_error(error: &AppError, status: StatusCode) {
    if status.is_server_error() {
        tracing::error!(error = %error, code = error.error_code(), "Request failed");
    } else {
        tracing::debug!(error = %error, code = error.error_code(), "Request rejected");
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = http_status(app_error);

        log_error(app_error, status);

        // Internal failure details never reach clients.
        let body = match app_error {
            AppError::Validation(errors) => Json(ErrorResponse {
                error: "Validation failed".to_string(),
                code: app_error.error_code().to_string(),
                details: Some(errors.errors.clone()),
            }),
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                Json(ErrorResponse::new(
                    "Internal server error",
                    app_error.error_code(),
                ))
            }
            other => Json(ErrorResponse::new(other.to_string(), other.error_code())),
        };

        (status, body).into_response()
    }
}
