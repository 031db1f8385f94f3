use crate::auth::models::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, TimeZone, Utc};
use docvault_core::models::DocumentResponse;
use docvault_core::policy::{authorize, Capability};
use docvault_core::validation::{FieldError, ValidationErrors};
use docvault_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// Only documents expiring strictly before this epoch-seconds timestamp
    #[serde(default)]
    pub expires_before: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v0/documents",
    tag = "documents",
    params(ListQuery),
    responses(
        (status = 200, description = "The caller's active documents", body = Vec<DocumentResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 422, description = "Invalid expires_before filter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Listing is always scoped to the caller; authorize is kept for symmetry.
    if !authorize(Capability::ViewAny, auth.user_id, None) {
        return Err(AppError::Forbidden("Not allowed to list documents".to_string()).into());
    }

    let expires_before = parse_expires_before(query.expires_before)?;

    let documents = state
        .documents
        .list_active(auth.user_id, expires_before)
        .await?;

    let responses: Vec<DocumentResponse> =
        documents.into_iter().map(DocumentResponse::from).collect();

    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/v0/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document found", body = DocumentResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the document owner", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .documents
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    if !authorize(Capability::View, auth.user_id, Some(&document)) {
        return Err(AppError::Forbidden("Not allowed to view this document".to_string()).into());
    }

    Ok(Json(DocumentResponse::from(document)))
}

/// A timestamp chrono cannot represent is rejected rather than silently
/// turning the filtered listing into an unfiltered one.
fn parse_expires_before(ts: Option<i64>) -> Result<Option<DateTime<Utc>>, ValidationErrors> {
    let Some(ts) = ts else {
        return Ok(None);
    };
    match Utc.timestamp_opt(ts, 0).single() {
        Some(dt) => Ok(Some(dt)),
        None => {
            let mut errors = ValidationErrors::new();
            errors.push(FieldError::new(
                "expires_before",
                "timestamp is out of range",
            ));
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_missing_and_ordinary_timestamps() {
        assert_eq!(parse_expires_before(None).unwrap(), None);

        let parsed = parse_expires_before(Some(1704067200)).unwrap().unwrap();
        assert_eq!(parsed.timestamp(), 1704067200);
    }

    #[test]
    fn out_of_range_timestamp_is_a_validation_error() {
        let err = parse_expires_before(Some(i64::MAX)).unwrap_err();
        assert_eq!(err.errors[0].field, "expires_before");

        let err = parse_expires_before(Some(i64::MIN)).unwrap_err();
        assert_eq!(err.errors[0].field, "expires_before");
    }
}
