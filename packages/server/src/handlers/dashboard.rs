use axum::Json;
use axum::extract::State;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{blog, enquiry, machine, part};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthAdmin;
use crate::models::dashboard::DashboardCounts;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/counts",
    tag = "Dashboard",
    operation_id = "dashboardCounts",
    summary = "Record counts",
    responses(
        (status = 200, description = "Counts", body = DashboardCounts),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth))]
pub async fn counts(
    _auth: AuthAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardCounts>, AppError> {
    let db = &state.db;
    let (machines, parts, blogs, enquiries, unread_enquiries) = tokio::try_join!(
        machine::Entity::find().count(db),
        part::Entity::find().count(db),
        blog::Entity::find().count(db),
        enquiry::Entity::find().count(db),
        enquiry::Entity::find()
            .filter(enquiry::Column::IsRead.eq(false))
            .count(db),
    )?;

    Ok(Json(DashboardCounts {
        machines,
        parts,
        blogs,
        enquiries,
        unread_enquiries,
    }))
}
