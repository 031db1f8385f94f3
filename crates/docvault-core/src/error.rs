//! Error types module
//!
//! All errors are unified under the `AppError` enum which can represent
//! database, storage, validation and authorization failures.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx`
//! feature so non-database crates can depend on this one without pulling in
//! the driver.

use crate::validation::ValidationErrors;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldError, ValidationErrors};

    #[test]
    fn validation_errors_convert_into_app_error() {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::new("name", "name is required"));
        let err: AppError = errors.into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            AppError::NotFound("doc".into()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            AppError::Forbidden("nope".into()).error_code(),
            "FORBIDDEN"
        );
        assert_eq!(
            AppError::Unauthorized("who".into()).error_code(),
            "UNAUTHORIZED"
        );
    }
}
