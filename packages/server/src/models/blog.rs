use chrono::{DateTime, Utc};
use common::ImageRef;
use common::images::{image_from_json, images_from_json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::shared::{double_option, validate_images, validate_title};
use crate::entity::blog;
use crate::error::AppError;

#[derive(Deserialize, ToSchema)]
pub struct CreateBlogRequest {
    #[schema(example = "Choosing a backhoe loader for monsoon work")]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    /// Defaults to the first image when omitted.
    #[serde(default)]
    pub featured_image: Option<ImageRef>,
}

#[derive(Deserialize, Default, ToSchema)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub images: Option<Vec<ImageRef>>,
    /// `null` clears the featured image.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<ImageRef>)]
    pub featured_image: Option<Option<ImageRef>>,
}

#[derive(Serialize, ToSchema)]
pub struct BlogResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub images: Vec<ImageRef>,
    pub featured_image: Option<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<blog::Model> for BlogResponse {
    fn from(b: blog::Model) -> Self {
        Self {
            images: images_from_json(&b.images),
            featured_image: b.featured_image.as_ref().and_then(image_from_json),
            id: b.id,
            title: b.title,
            content: b.content,
            author: b.author,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

pub fn validate_create_blog(payload: &CreateBlogRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if payload.content.trim().is_empty() {
        return Err(AppError::Validation("Content must not be empty".into()));
    }
    validate_images(&payload.images)?;
    if let Some(ref featured) = payload.featured_image {
        validate_images(std::slice::from_ref(featured))?;
    }
    Ok(())
}

pub fn validate_update_blog(payload: &UpdateBlogRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }
    if let Some(ref content) = payload.content
        && content.trim().is_empty()
    {
        return Err(AppError::Validation("Content must not be empty".into()));
    }
    if let Some(ref author) = payload.author
        && author.chars().count() > 128
    {
        return Err(AppError::Validation("Author must be at most 128 characters".into()));
    }
    if let Some(ref images) = payload.images {
        validate_images(images)?;
    }
    if let Some(Some(ref featured)) = payload.featured_image {
        validate_images(std::slice::from_ref(featured))?;
    }
    Ok(())
}

/// The featured image a new post is stored with.
pub fn resolve_featured(images: &[ImageRef], featured: Option<ImageRef>) -> Option<ImageRef> {
    featured.or_else(|| images.first().cloned())
}
