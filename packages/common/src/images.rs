use serde::{Deserialize, Serialize};

/// An image returned by the asset host after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HostedImage {
    /// Public URL the frontend renders.
    #[serde(alias = "secure_url")]
    #[schema(example = "https://cdn.example.com/heavy_horizon/0193a1b2c3d4.jpg")]
    pub url: String,
    /// Key the asset host uses to delete the image. Uploads always set it;
    /// images saved by older clients may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "heavy_horizon/0193a1b2c3d4")]
    pub public_id: Option<String>,
}

/// An image attached to a machine, part, or blog.
///
/// Older records store bare URL strings; uploads made through the asset host
/// store the URL together with its provider identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ImageRef {
    Hosted(HostedImage),
    Legacy(String),
}

impl ImageRef {
    pub fn url(&self) -> &str {
        match self {
            ImageRef::Hosted(image) => &image.url,
            ImageRef::Legacy(url) => url,
        }
    }
}

impl From<HostedImage> for ImageRef {
    fn from(image: HostedImage) -> Self {
        ImageRef::Hosted(image)
    }
}

/// Decode an image list stored as JSON.
///
/// Entries that match neither shape (nulls, numbers, empty strings) are
/// dropped rather than failing the whole record.
pub fn images_from_json(value: &serde_json::Value) -> Vec<ImageRef> {
    match value {
        serde_json::Value::Array(items) => items.iter().filter_map(image_from_json).collect(),
        _ => Vec::new(),
    }
}

/// Decode a single image stored as JSON.
pub fn image_from_json(value: &serde_json::Value) -> Option<ImageRef> {
    match serde_json::from_value::<ImageRef>(value.clone()).ok()? {
        ImageRef::Legacy(url) if url.trim().is_empty() => None,
        image => Some(image),
    }
}

/// Encode a single image for a JSON column.
pub fn image_to_json(image: &ImageRef) -> serde_json::Value {
    match image {
        ImageRef::Hosted(hosted) => match &hosted.public_id {
            Some(public_id) => serde_json::json!({"url": hosted.url, "public_id": public_id}),
            None => serde_json::json!({"url": hosted.url}),
        },
        ImageRef::Legacy(url) => serde_json::Value::String(url.clone()),
    }
}

/// Encode an image list for a JSON column.
pub fn images_to_json(images: &[ImageRef]) -> serde_json::Value {
    serde_json::to_value(images).unwrap_or_else(|_| serde_json::Value::Array(Vec::new()))
}
