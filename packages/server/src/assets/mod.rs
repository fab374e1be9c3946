//! Keeping hosted images in step with the records that reference them.
//!
//! Handlers compute a [`CleanupPlan`] from the persisted state before a
//! mutation, commit the mutation, then hand the plan to [`cleanup::dispatch`].
//! A failed deletion never undoes the mutation.

pub mod cleanup;
pub mod reconcile;

use std::sync::Arc;

use common::storage::AssetHost;
use common::storage::filesystem::FilesystemAssetHost;
use common::storage::s3::{S3AssetHost, S3Settings};

pub use reconcile::CleanupPlan;

use crate::config::{AssetBackend, AssetConfig};

/// Build the configured asset host.
pub async fn build_asset_host(config: &AssetConfig) -> anyhow::Result<Arc<dyn AssetHost>> {
    match config.backend {
        AssetBackend::Filesystem => {
            let host = FilesystemAssetHost::new(
                config.filesystem.root.clone(),
                config.filesystem.public_base_url.clone(),
                config.max_upload_size,
            )
            .await?;
            Ok(Arc::new(host))
        }
        AssetBackend::S3 => {
            let s3 = config
                .s3
                .clone()
                .ok_or_else(|| anyhow::anyhow!("assets.backend = \"s3\" requires an [assets.s3] section"))?;
            let host = S3AssetHost::new(S3Settings {
                bucket: s3.bucket,
                region: s3.region,
                endpoint: s3.endpoint,
                access_key: s3.access_key,
                secret_key: s3.secret_key,
                path_style: s3.path_style,
                public_base_url: s3.public_base_url,
                max_size: config.max_upload_size,
            })?;
            Ok(Arc::new(host))
        }
    }
}
