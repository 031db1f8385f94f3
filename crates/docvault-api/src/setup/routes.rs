//! Route configuration and setup.

use crate::api_doc;
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use docvault_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt_secret: config.jwt_secret.clone(),
    });

    let protected_routes = Router::new()
        .route(
            "/api/v0/documents",
            get(handlers::document_get::list_documents)
                .post(handlers::document_upload::upload_document),
        )
        .route(
            "/api/v0/documents/{id}",
            get(handlers::document_get::get_document)
                .put(handlers::document_archive::archive_document),
        )
        .route(
            "/api/v0/documents/{id}/file",
            get(handlers::document_download::download_document),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/openapi.json", get(openapi_spec));

    // Allow slack beyond the document limit for multipart framing and text fields.
    let body_limit = config.max_document_size_bytes + 64 * 1024;

    let app = public_routes
        .merge(protected_routes)
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Liveness probe - process is running.
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

async fn openapi_spec() -> impl IntoResponse {
    Json(api_doc::get_openapi_spec())
}
