use common::ImageRef;
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a required text field after trimming (1-`max` Unicode characters).
pub fn validate_required(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Validate a title (1-256 characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    validate_required("Title", title, 256)
}

/// Every image must carry a URL; hosted images are trusted as the host returned them.
pub fn validate_images(images: &[ImageRef]) -> Result<(), AppError> {
    if images.iter().any(|image| image.url().trim().is_empty()) {
        return Err(AppError::Validation("Image URLs must not be empty".into()));
    }
    Ok(())
}

/// Treat blank optional strings as absent.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
