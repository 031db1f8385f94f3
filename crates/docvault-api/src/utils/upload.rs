//! Common utilities for the upload handler

use axum::extract::Multipart;
use chrono::{DateTime, TimeZone, Utc};
use docvault_core::validation::{FieldError, ValidationErrors};

/// Fields extracted from the document upload form.
pub struct UploadForm {
    pub name: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub file_data: Option<Vec<u8>>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Extract the upload form from a multipart request.
///
/// Accepts a `name` text field, an optional `expires_at` field (epoch
/// seconds) and exactly one `file` field. Multiple file fields are rejected.
pub async fn extract_upload_form(mut multipart: Multipart) -> Result<UploadForm, ValidationErrors> {
    let mut form = UploadForm {
        name: None,
        expires_at: None,
        file_data: None,
        filename: None,
        content_type: None,
    };
    let mut errors = ValidationErrors::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::new(
            "body",
            format!("Failed to read multipart body: {}", e),
        ));
        errors
    })? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "name" => {
                form.name = field.text().await.ok();
            }
            "expires_at" => {
                let raw = field.text().await.unwrap_or_default();
                if raw.trim().is_empty() {
                    continue;
                }
                match raw.trim().parse::<i64>() {
                    Ok(ts) => match Utc.timestamp_opt(ts, 0).single() {
                        Some(dt) => form.expires_at = Some(dt),
                        None => errors.push(FieldError::new(
                            "expires_at",
                            "expiry timestamp is out of range",
                        )),
                    },
                    Err(_) => errors.push(FieldError::new(
                        "expires_at",
                        "expiry must be an epoch-seconds timestamp",
                    )),
                }
            }
            "file" => {
                if form.file_data.is_some() {
                    errors.push(FieldError::new(
                        "file",
                        "Multiple file fields are not allowed; send exactly one field named 'file'",
                    ));
                    continue;
                }
                form.filename = field.file_name().map(|s: &str| s.to_string());
                form.content_type = field.content_type().map(|s: &str| s.to_string());

                match field.bytes().await {
                    Ok(data) => form.file_data = Some(data.to_vec()),
                    Err(e) => errors.push(FieldError::new(
                        "file",
                        format!("Failed to read file data: {}", e),
                    )),
                }
            }
            _ => {}
        }
    }

    errors.into_result()?;
    Ok(form)
}
