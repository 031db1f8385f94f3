//! HS256 token validation. Tokens are issued by the identity provider, not
//! by this service.

use docvault_core::AppError;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::models::JwtClaims;

/// Validate a token and return its claims. Expired or tampered tokens are
/// rejected as Unauthorized.
pub fn validate_token(secret: &str, token: &str) -> Result<JwtClaims, AppError> {
    let validation = Validation::default();
    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
