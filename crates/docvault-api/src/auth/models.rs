use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub exp: i64,  // expiration timestamp
    pub iat: i64,  // issued at timestamp
}

/// Authenticated user context extracted from the JWT and stored in request extensions
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
}

// Implement FromRequestParts for AuthContext to work with Multipart
// Extension cannot be used with Multipart, so we extract directly from request parts
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new("Missing auth context", "UNAUTHORIZED")),
                )
            })
    }
}
