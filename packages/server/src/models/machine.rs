use chrono::{DateTime, Utc};
use common::ImageRef;
use common::images::images_from_json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::shared::{double_option, validate_images, validate_required, validate_title};
use crate::entity::machine;
use crate::error::AppError;

pub const DEFAULT_STATUS: &str = "Available";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// Request body for creating a machine listing.
#[derive(Deserialize, ToSchema)]
pub struct CreateMachineRequest {
    #[schema(example = "JCB 3DX Super")]
    pub title: String,
    /// Drives code allocation for mapped categories.
    #[schema(example = "Backhoe Loader")]
    pub category: String,
    #[serde(rename = "type")]
    #[schema(example = "Rental")]
    pub machine_type: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub hours: Option<i32>,
    /// Rich-text description.
    #[serde(default)]
    pub condition: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Only honoured for categories without a code prefix.
    #[serde(rename = "machineCode", default)]
    pub machine_code: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// Partial update. `machineCode`, `id` and `_id` are not accepted and are
/// dropped if sent.
#[derive(Deserialize, Default, ToSchema)]
pub struct UpdateMachineRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub machine_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub model: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub hours: Option<Option<i32>>,
    pub condition: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    /// Full replacement list. Images dropped from it are deleted from the host.
    pub images: Option<Vec<ImageRef>>,
}

#[derive(Serialize, ToSchema)]
pub struct MachineResponse {
    pub id: i32,
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub machine_type: String,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub hours: Option<i32>,
    pub condition: String,
    pub status: String,
    pub location: Option<String>,
    #[serde(rename = "machineCode")]
    #[schema(example = "BL-0001")]
    pub machine_code: Option<String>,
    pub images: Vec<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<machine::Model> for MachineResponse {
    fn from(m: machine::Model) -> Self {
        Self {
            images: images_from_json(&m.images),
            id: m.id,
            title: m.title,
            category: m.category,
            machine_type: m.machine_type,
            model: m.model,
            year: m.year,
            hours: m.hours,
            condition: m.condition,
            status: m.status,
            location: m.location,
            machine_code: m.machine_code,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MachineListQuery {
    /// Exact match on the listing purpose.
    #[serde(rename = "type")]
    pub machine_type: Option<String>,
    /// Exact match on the category.
    pub category: Option<String>,
}

fn validate_year(year: Option<i32>) -> Result<(), AppError> {
    if let Some(year) = year
        && !(1900..=2100).contains(&year)
    {
        return Err(AppError::Validation("Year must be between 1900 and 2100".into()));
    }
    Ok(())
}

fn validate_hours(hours: Option<i32>) -> Result<(), AppError> {
    if let Some(hours) = hours
        && hours < 0
    {
        return Err(AppError::Validation("Hours must be >= 0".into()));
    }
    Ok(())
}

pub fn validate_create_machine(payload: &CreateMachineRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    validate_required("Category", &payload.category, 128)?;
    validate_required("Type", &payload.machine_type, 64)?;
    validate_required("Status", &payload.status, 64)?;
    validate_year(payload.year)?;
    validate_hours(payload.hours)?;
    validate_images(&payload.images)
}

pub fn validate_update_machine(payload: &UpdateMachineRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }
    if let Some(ref category) = payload.category {
        validate_required("Category", category, 128)?;
    }
    if let Some(ref machine_type) = payload.machine_type {
        validate_required("Type", machine_type, 64)?;
    }
    if let Some(ref status) = payload.status {
        validate_required("Status", status, 64)?;
    }
    validate_year(payload.year.flatten())?;
    validate_hours(payload.hours.flatten())?;
    if let Some(ref images) = payload.images {
        validate_images(images)?;
    }
    Ok(())
}
