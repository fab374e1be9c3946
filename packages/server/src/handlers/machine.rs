use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::images::{images_from_json, images_to_json};
use sea_orm::*;
use tracing::instrument;

use crate::assets::CleanupPlan;
use crate::codes::allocator::insert_machine;
use crate::entity::machine;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthAdmin;
use crate::extractors::json::AppJson;
use crate::models::machine::*;
use crate::models::shared::normalize_optional;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Machines",
    operation_id = "listMachines",
    summary = "List machines",
    description = "Returns all machines, newest first, optionally filtered by `type` and `category` (exact match).",
    params(MachineListQuery),
    responses(
        (status = 200, description = "Machines", body = Vec<MachineResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_machines(
    State(state): State<AppState>,
    Query(query): Query<MachineListQuery>,
) -> Result<Json<Vec<MachineResponse>>, AppError> {
    let mut select = machine::Entity::find();
    if let Some(machine_type) = normalize_optional(query.machine_type) {
        select = select.filter(machine::Column::MachineType.eq(machine_type));
    }
    if let Some(category) = normalize_optional(query.category) {
        select = select.filter(machine::Column::Category.eq(category));
    }

    let machines = select
        .order_by_desc(machine::Column::CreatedAt)
        .order_by_desc(machine::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(machines.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Machines",
    operation_id = "getMachine",
    summary = "Get a machine by ID",
    params(("id" = i32, Path, description = "Machine ID")),
    responses(
        (status = 200, description = "Machine details", body = MachineResponse),
        (status = 404, description = "Machine not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_machine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MachineResponse>, AppError> {
    let model = find_machine(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Machines",
    operation_id = "createMachine",
    summary = "Create a machine listing",
    description = "For categories with a code prefix (Backhoe Loader, Excavator, Backhoe Loader with Breaker) the next `machineCode` is allocated and any supplied code is ignored. Other categories keep the supplied `machineCode`, if any.",
    request_body = CreateMachineRequest,
    responses(
        (status = 201, description = "Machine created", body = MachineResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Code could not be allocated or is taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth, payload), fields(title = %payload.title, category = %payload.category))]
pub async fn create_machine(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateMachineRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_machine(&payload)?;

    let now = chrono::Utc::now();
    let category = payload.category.trim().to_string();
    let draft = machine::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        category: Set(category.clone()),
        machine_type: Set(payload.machine_type.trim().to_string()),
        model: Set(normalize_optional(payload.model)),
        year: Set(payload.year),
        hours: Set(payload.hours),
        condition: Set(payload.condition),
        status: Set(payload.status.trim().to_string()),
        location: Set(normalize_optional(payload.location)),
        images: Set(images_to_json(&payload.images)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let supplied = normalize_optional(payload.machine_code);
    let model = insert_machine(&state.db, draft, &category, supplied).await?;

    Ok((StatusCode::CREATED, Json(MachineResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Machines",
    operation_id = "updateMachine",
    summary = "Update a machine listing",
    description = "Partially updates a machine. `machineCode` is immutable and ignored if sent. When `images` is given, images missing from the new list are deleted from the asset host after the update is saved.",
    params(("id" = i32, Path, description = "Machine ID")),
    request_body = UpdateMachineRequest,
    responses(
        (status = 200, description = "Machine updated", body = MachineResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Machine not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth, payload), fields(id))]
pub async fn update_machine(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateMachineRequest>,
) -> Result<Json<MachineResponse>, AppError> {
    validate_update_machine(&payload)?;

    let existing = find_machine(&state.db, id).await?;
    let plan = match payload.images {
        Some(ref new) => {
            CleanupPlan::for_update(&images_from_json(&existing.images), new, state.asset_folder())
        }
        None => CleanupPlan::default(),
    };

    let mut active: machine::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(category.trim().to_string());
    }
    if let Some(machine_type) = payload.machine_type {
        active.machine_type = Set(machine_type.trim().to_string());
    }
    if let Some(model) = payload.model {
        active.model = Set(normalize_optional(model));
    }
    if let Some(year) = payload.year {
        active.year = Set(year);
    }
    if let Some(hours) = payload.hours {
        active.hours = Set(hours);
    }
    if let Some(condition) = payload.condition {
        active.condition = Set(condition);
    }
    if let Some(status) = payload.status {
        active.status = Set(status.trim().to_string());
    }
    if let Some(location) = payload.location {
        active.location = Set(normalize_optional(location));
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
    tag = "Machines",
    operation_id = "deleteMachine",
    summary = "Delete a machine listing",
    description = "Deletes the machine, then deletes its images from the asset host. Image deletion failures are logged and do not fail the request.",
    params(("id" = i32, Path, description = "Machine ID")),
    responses(
        (status = 204, description = "Machine deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Machine not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth), fields(id))]
pub async fn delete_machine(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let existing = find_machine(&state.db, id).await?;
    let plan = CleanupPlan::for_images(&images_from_json(&existing.images), state.asset_folder());

    let result = machine::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Machine not found".into()));
    }
    state.cleanup(plan).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_machine<C: ConnectionTrait>(db: &C, id: i32) -> Result<machine::Model, AppError> {
    machine::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Machine not found".into()))
}
