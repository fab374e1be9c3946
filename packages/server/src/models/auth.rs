use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for admin login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@heavyhorizon.in")]
    pub email: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// HS256 bearer token, valid for `auth.token_ttl_hours` (8 by default).
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "admin@heavyhorizon.in")]
    pub email: String,
}

/// The authenticated admin.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "admin@heavyhorizon.in")]
    pub email: String,
}
