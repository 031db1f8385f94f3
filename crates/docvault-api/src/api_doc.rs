//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use docvault_core::models;
use docvault_core::validation;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Returns the OpenAPI spec served at /api/openapi.json.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docvault API",
        version = "0.1.0",
        description = "Document management API (v0). Authenticated users upload PDF documents with optional expiry dates, list and retrieve their own documents, and archive them. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::document_upload::upload_document,
        handlers::document_get::get_document,
        handlers::document_get::list_documents,
        handlers::document_download::download_document,
        handlers::document_archive::archive_document,
    ),
    components(schemas(
        models::DocumentResponse,
        validation::FieldError,
        error::ErrorResponse,
        handlers::document_archive::ArchiveRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "documents", description = "Document upload, retrieval and archiving")
    )
)]
struct ApiDoc;
