mod error;
mod naming;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::AssetError;
pub use naming::{IMAGE_EXTENSIONS, image_extension, new_public_id, validate_public_id};
pub use traits::AssetHost;
