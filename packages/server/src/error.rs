use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::AssetError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `NOT_FOUND`, `CONFLICT`,
    /// `ASSET_HOST_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Mobile number must be exactly 10 digits")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    NotFound(String),
    /// Unique machine code already taken, or allocation retries ran out.
    Conflict(String),
    /// The image host failed an upload. Details are logged, not returned.
    AssetHost(String),
    /// Details are logged, not returned.
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TokenMissing | AppError::TokenInvalid | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::AssetHost(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::TokenMissing => "TOKEN_MISSING",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::AssetHost(_) => "ASSET_HOST_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn into_message(self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Conflict(msg) => msg,
            AppError::TokenMissing => "Authentication required".into(),
            AppError::TokenInvalid => "Invalid or expired token".into(),
            AppError::InvalidCredentials => "Invalid email or password".into(),
            AppError::AssetHost(detail) => {
                tracing::warn!("Asset host error: {}", detail);
                "Image host request failed".into()
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "An unexpected error occurred".into()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: self.code(),
            message: self.into_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::SizeLimitExceeded { .. }
            | AssetError::UnsupportedType(_)
            | AssetError::InvalidIdentifier(_) => AppError::Validation(err.to_string()),
            AssetError::Io(e) => AppError::Internal(format!("Asset storage IO error: {e}")),
            AssetError::Remote(detail) => AppError::AssetHost(detail),
        }
    }
}
