use crate::auth::models::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use docvault_core::policy::{authorize, Capability};
use docvault_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/documents/{id}/file",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document file", content_type = "application/pdf"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the document owner", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %auth.user_id, document_id = %id, operation = "download_document")
)]
pub async fn download_document(
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

    tracing::debug!(storage_key = %document.path, "Proxying document from storage");

    let data = state.storage.download(&document.path).await?;

    let content_disposition = format!(
        "attachment; filename=\"{}.pdf\"",
        sanitize_filename(&document.name)
    );

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Names are only length-checked at upload, so anything that would break the
/// quoted-string form of the header (control characters, `"` and `\`) is
/// replaced before use.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_control() || c == '"' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(sanitize_filename("Quarterly report 2024"), "Quarterly report 2024");
    }

    #[test]
    fn header_breaking_characters_are_replaced() {
        assert_eq!(sanitize_filename("report\nQ3"), "report_Q3");
        assert_eq!(sanitize_filename("say \"hi\""), "say _hi_");
        assert_eq!(sanitize_filename("back\\slash"), "back_slash");
    }

    #[test]
    fn sanitized_names_always_form_a_valid_header() {
        for name in ["report\nQ3", "tab\there", "quote\"d", "plain.pdf"] {
            let value = format!("attachment; filename=\"{}.pdf\"", sanitize_filename(name));
            assert!(HeaderValue::from_str(&value).is_ok(), "header rejected for {:?}", name);
        }
    }
}
