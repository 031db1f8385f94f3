use crate::auth::models::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use docvault_core::models::DocumentResponse;
use docvault_core::policy::{authorize, Capability};
use docvault_core::validation::validate_archived_at;
use docvault_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ArchiveRequest {
    /// Archive timestamp in epoch seconds. Must not be in the future.
    /// `null` (or omitted) clears the archive marker, restoring the document.
    #[serde(default)]
    pub archived_at: Option<i64>,
}

#[utoipa::path(
    put,
    path = "/api/v0/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Document updated", body = DocumentResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the document owner", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn archive_document(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(request): Json<ArchiveRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .documents
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    // Clearing the marker is a restore; setting it is an update.
    let capability = if request.archived_at.is_none() {
        Capability::Restore
    } else {
        Capability::Update
    };
    if !authorize(capability, auth.user_id, Some(&document)) {
        return Err(AppError::Forbidden("Not allowed to update this document".to_string()).into());
    }

    let archived_at = validate_archived_at(request.archived_at, Utc::now())?;

    let updated = state
        .documents
        .set_archived(id, archived_at)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(DocumentResponse::from(updated)))
}
