use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated admin extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to gate the handler; the body never runs
/// for a missing or invalid token.
#[derive(Debug)]
pub struct AuthAdmin {
    pub admin_id: i32,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthAdmin {
            admin_id: claims.uid,
            email: claims.sub,
        })
    }
}
