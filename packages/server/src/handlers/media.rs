use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::filename::validate_media_path;

/// Serve a file stored by the filesystem asset host.
///
/// Stored names are unique per upload, so responses are cacheable for long.
#[instrument(skip(state))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let relative = validate_media_path(&path).map_err(|e| AppError::Validation(e.to_string()))?;
    let full_path = state.config.assets.filesystem.root.join(relative);

    let content = match tokio::fs::read(&full_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Image not found".into()));
        }
        Err(e) if e.kind() == std::io::ErrorKind::IsADirectory => {
            return Err(AppError::NotFound("Image not found".into()));
        }
        Err(e) => return Err(AppError::Internal(format!("IO error: {}", e))),
    };

    let mime = mime_guess::from_path(&full_path).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from(content))
        .map_err(|e| AppError::Internal(e.to_string()))
}
