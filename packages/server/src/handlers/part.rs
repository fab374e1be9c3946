use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::images::{images_from_json, images_to_json};
use sea_orm::*;
use tracing::instrument;

use crate::assets::CleanupPlan;
use crate::entity::part;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthAdmin;
use crate::extractors::json::AppJson;
use crate::models::part::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Parts",
    operation_id = "listParts",
    summary = "List spare parts",
    responses(
        (status = 200, description = "Parts, newest first", body = Vec<PartResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_parts(State(state): State<AppState>) -> Result<Json<Vec<PartResponse>>, AppError> {
    let parts = part::Entity::find()
        .order_by_desc(part::Column::CreatedAt)
        .order_by_desc(part::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(parts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Parts",
    operation_id = "createPart",
    summary = "Create a spare part",
    request_body = CreatePartRequest,
    responses(
        (status = 201, description = "Part created", body = PartResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth, payload), fields(name = %payload.name))]
pub async fn create_part(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePartRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_part(&payload)?;

    let now = chrono::Utc::now();
    let model = part::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        compatibility: Set(payload.compatibility.trim().to_string()),
        condition: Set(payload.condition.trim().to_string()),
        images: Set(images_to_json(&payload.images)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(PartResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Parts",
    operation_id = "updatePart",
    summary = "Update a spare part",
    description = "Partially updates a part. When `images` is given, images missing from the new list are deleted from the asset host after the update is saved.",
    params(("id" = i32, Path, description = "Part ID")),
    request_body = UpdatePartRequest,
    responses(
        (status = 200, description = "Part updated", body = PartResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Part not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth, payload), fields(id))]
pub async fn update_part(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdatePartRequest>,
) -> Result<Json<PartResponse>, AppError> {
    validate_update_part(&payload)?;

    let existing = find_part(&state.db, id).await?;
    let plan = match payload.images {
        Some(ref new) => {
            CleanupPlan::for_update(&images_from_json(&existing.images), new, state.asset_folder())
        }
        None => CleanupPlan::default(),
    };

    let mut active: part::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(compatibility) = payload.compatibility {
        active.compatibility = Set(compatibility.trim().to_string());
    }
    if let Some(condition) = payload.condition {
        active.condition = Set(condition.trim().to_string());
    }
    if let Some(ref images) = payload.images {
        active.images = Set(images_to_json(images));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    state.cleanup(plan).await;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Parts",
    operation_id = "deletePart",
    summary = "Delete a spare part",
    params(("id" = i32, Path, description = "Part ID")),
    responses(
        (status = 204, description = "Part deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Part not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth), fields(id))]
pub async fn delete_part(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let existing = find_part(&state.db, id).await?;
    let plan = CleanupPlan::for_images(&images_from_json(&existing.images), state.asset_folder());

    let result = part::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Part not found".into()));
    }
    state.cleanup(plan).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_part<C: ConnectionTrait>(db: &C, id: i32) -> Result<part::Model, AppError> {
    part::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Part not found".into()))
}
