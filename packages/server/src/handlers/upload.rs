use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{HostedImage, ImageRef};
use tracing::{info, instrument, warn};

use crate::assets::CleanupPlan;
use crate::config::AssetConfig;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthAdmin;
use crate::state::AppState;
use crate::utils::filename::validate_upload_filename;

/// Multipart field carrying the files.
pub const IMAGES_FIELD: &str = "images";
pub const MAX_FILES_PER_UPLOAD: usize = 10;

#[utoipa::path(
    post,
    path = "/",
    tag = "Uploads",
    operation_id = "uploadImages",
    summary = "Upload images to the asset host",
    description = "Accepts one or more files in the `images` multipart field (at most 10). \
        Returns one `{url, public_id}` per file, in order, to be stored on a machine, part or blog. \
        If any file fails, the ones already uploaded in the same request are deleted again.",
    request_body(content_type = "multipart/form-data", description = "Image files in the `images` field"),
    responses(
        (status = 201, description = "Images uploaded", body = Vec<HostedImage>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Asset host failed (ASSET_HOST_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth, multipart))]
pub async fn upload_images(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut uploaded = Vec::new();

    if let Err(e) = receive_images(&state, &mut multipart, &mut uploaded).await {
        if !uploaded.is_empty() {
            warn!(count = uploaded.len(), "Upload failed part-way, removing stored images");
            let orphans: Vec<ImageRef> = uploaded.into_iter().map(ImageRef::from).collect();
            state
                .cleanup(CleanupPlan::for_images(&orphans, state.asset_folder()))
                .await;
        }
        return Err(e);
    }

    if uploaded.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing '{IMAGES_FIELD}' field"
        )));
    }

    info!(count = uploaded.len(), "Images uploaded");
    Ok((StatusCode::CREATED, Json(uploaded)))
}

async fn receive_images(
    state: &AppState,
    multipart: &mut Multipart,
    uploaded: &mut Vec<HostedImage>,
) -> Result<(), AppError> {
    let max_size = state.config.assets.max_upload_size;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        if uploaded.len() >= MAX_FILES_PER_UPLOAD {
            return Err(AppError::Validation(format!(
                "At most {MAX_FILES_PER_UPLOAD} images per upload"
            )));
        }

        let filename = field
            .file_name()
            .ok_or_else(|| AppError::Validation("Image field must have a filename".into()))?;
        let filename = validate_upload_filename(filename)
            .map_err(|e| AppError::Validation(e.to_string()))?
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            if (data.len() + chunk.len()) as u64 > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            data.extend_from_slice(&chunk);
        }

        let image = state
            .assets
            .upload(data, &filename, state.asset_folder())
            .await?;
        uploaded.push(image);
    }

    Ok(())
}

pub fn upload_body_limit(config: &AssetConfig) -> DefaultBodyLimit {
    let per_file = usize::try_from(config.max_upload_size).unwrap_or(usize::MAX);
    // Room for multipart framing on top of the files themselves.
    DefaultBodyLimit::max(
        per_file
            .saturating_mul(MAX_FILES_PER_UPLOAD)
            .saturating_add(64 * 1024),
    )
}
