use crate::auth::models::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{DocumentUploadService, UploadRequest};
use crate::state::AppState;
use crate::utils::upload::extract_upload_form;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use docvault_core::models::DocumentResponse;
use docvault_core::policy::{authorize, Capability};
use docvault_core::AppError;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v0/documents",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: name (text, required), file (PDF, required), expires_at (epoch seconds, optional)"),
    responses(
        (status = 201, description = "Document uploaded successfully", body = DocumentResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    if !authorize(Capability::Create, auth.user_id, None) {
        return Err(AppError::Forbidden("Not allowed to upload documents".to_string()).into());
    }

    let form = extract_upload_form(multipart).await?;

    let data = form.file_data.unwrap_or_default();
    let request = UploadRequest {
        owner_id: auth.user_id,
        name: form.name.unwrap_or_default(),
        filename: form.filename.unwrap_or_default(),
        content_type: form.content_type.unwrap_or_default(),
        data,
        expires_at: form.expires_at,
    };

    let service = DocumentUploadService::new(state.documents.clone(), state.storage.clone());
    let document = service.upload(request, Utc::now()).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(DocumentResponse::from(document)),
    ))
}
