use async_trait::async_trait;

use super::error::AssetError;
use crate::images::HostedImage;

/// Remote image hosting used by uploads and record cleanup.
#[async_trait]
pub trait AssetHost: Send + Sync {
    /// Store an image under `folder` and return its public URL and identifier.
    async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<HostedImage, AssetError>;

    /// Delete an image by its provider identifier.
    ///
    /// Returns `true` if something was deleted, `false` if nothing matched.
    async fn destroy(&self, public_id: &str) -> Result<bool, AssetError>;
}
