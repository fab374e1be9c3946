use chrono::{DateTime, Utc};
use common::ImageRef;
use common::images::images_from_json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::shared::{validate_images, validate_required};
use crate::entity::part;
use crate::error::AppError;

#[derive(Deserialize, ToSchema)]
pub struct CreatePartRequest {
    #[schema(example = "Hydraulic pump")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "JCB 3DX, JCB 3DX Super")]
    pub compatibility: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

#[derive(Deserialize, Default, ToSchema)]
pub struct UpdatePartRequest {
    pub name: Option<String>,
    pub compatibility: Option<String>,
    pub condition: Option<String>,
    /// Full replacement list. Images dropped from it are deleted from the host.
    pub images: Option<Vec<ImageRef>>,
}

#[derive(Serialize, ToSchema)]
pub struct PartResponse {
    pub id: i32,
    pub name: String,
    pub compatibility: String,
    pub condition: String,
    pub images: Vec<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<part::Model> for PartResponse {
    fn from(p: part::Model) -> Self {
        Self {
            images: images_from_json(&p.images),
            id: p.id,
            name: p.name,
            compatibility: p.compatibility,
            condition: p.condition,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

pub fn validate_create_part(payload: &CreatePartRequest) -> Result<(), AppError> {
    validate_required("Name", &payload.name, 256)?;
    validate_images(&payload.images)
}

pub fn validate_update_part(payload: &UpdatePartRequest) -> Result<(), AppError> {
    if let Some(ref name) = payload.name {
        validate_required("Name", name, 256)?;
    }
    if let Some(ref images) = payload.images {
        validate_images(images)?;
    }
    Ok(())
}
