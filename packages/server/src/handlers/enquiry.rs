use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::enquiry;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthAdmin;
use crate::extractors::json::AppJson;
use crate::models::enquiry::*;
use crate::models::shared::normalize_optional;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Enquiries",
    operation_id = "submitEnquiry",
    summary = "Submit an enquiry",
    description = "Public endpoint. `mobile` must be exactly 10 digits; `email`, when present, must contain `@` followed by a dotted domain.",
    request_body = CreateEnquiryRequest,
    responses(
        (status = 201, description = "Enquiry stored", body = EnquiryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(enquiry_type = %payload.enquiry_type))]
pub async fn submit_enquiry(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<CreateEnquiryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_enquiry(&mut payload)?;

    let model = enquiry::ActiveModel {
        enquiry_type: Set(payload.enquiry_type),
        message: Set(payload.message.trim().to_string()),
        mobile: Set(payload.mobile),
        email: Set(payload.email),
        machine_id: Set(payload.machine_id),
        machine_title: Set(payload.machine_title),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(id = model.id, "Enquiry submitted");
    Ok((StatusCode::CREATED, Json(EnquiryResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Enquiries",
    operation_id = "listEnquiries",
    summary = "List enquiries",
    description = "Newest first, optionally filtered by `type`.",
    params(EnquiryListQuery),
    responses(
        (status = 200, description = "Enquiries", body = Vec<EnquiryResponse>),
        (status = 400, description = "Unknown type (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth, query))]
pub async fn list_enquiries(
    _auth: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<EnquiryListQuery>,
) -> Result<Json<Vec<EnquiryResponse>>, AppError> {
    let mut select = enquiry::Entity::find();
    if let Some(kind) = normalize_optional(query.enquiry_type) {
        let kind = kind.to_lowercase();
        validate_enquiry_type(&kind)?;
        select = select.filter(enquiry::Column::EnquiryType.eq(kind));
    }

    let enquiries = select
        .order_by_desc(enquiry::Column::CreatedAt)
        .order_by_desc(enquiry::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(enquiries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/mark-read",
    tag = "Enquiries",
    operation_id = "markEnquiriesRead",
    summary = "Mark every unread enquiry as read",
    responses(
        (status = 200, description = "Number of enquiries marked", body = MarkReadResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth))]
pub async fn mark_read(
    _auth: AuthAdmin,
    State(state): State<AppState>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let result = enquiry::Entity::update_many()
        .col_expr(enquiry::Column::IsRead, Expr::value(true))
        .filter(enquiry::Column::IsRead.eq(false))
        .exec(&state.db)
        .await?;

    Ok(Json(MarkReadResponse {
        updated: result.rows_affected,
    }))
}
