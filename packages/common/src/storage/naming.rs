use std::path::Path;

use super::error::AssetError;

/// Lower-case file extensions accepted for upload.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif"];

/// Generate a fresh provider identifier inside `folder`.
///
/// UUIDv7 keeps identifiers roughly ordered by upload time.
pub fn new_public_id(folder: &str) -> String {
    format!("{}/{}", folder.trim_matches('/'), uuid::Uuid::now_v7().simple())
}

/// Return the normalized image extension of `filename`.
pub fn image_extension(filename: &str) -> Result<String, AssetError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| AssetError::UnsupportedType(filename.to_string()))?;

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AssetError::UnsupportedType(ext))
    }
}

/// Reject identifiers that are empty or could address files outside the store.
pub fn validate_public_id(public_id: &str) -> Result<(), AssetError> {
    let invalid = public_id.is_empty()
        || public_id.starts_with('/')
        || public_id.contains('\\')
        || public_id.contains('\0')
        || public_id
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(AssetError::InvalidIdentifier(public_id.to_string()));
    }
    Ok(())
}
