use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::admin;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthAdmin;
use crate::extractors::json::AppJson;
use crate::models::auth::{LoginRequest, LoginResponse, MeResponse, validate_login_request};
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in as an admin",
    description = "Exchanges admin credentials for a bearer token. Email matching is case-insensitive.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let email = payload.email.trim().to_lowercase();

    let admin = admin::Entity::find()
        .filter(admin::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &admin.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        admin.id,
        &admin.email,
        state.config.auth.token_ttl_hours,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        email: admin.email,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current admin",
    responses(
        (status = 200, description = "Token is valid", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth), fields(admin_id = auth.admin_id))]
pub async fn me(auth: AuthAdmin) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth.admin_id,
        email: auth.email,
    })
}
