use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::AssetError;
use super::naming::{image_extension, new_public_id, validate_public_id};
use super::traits::AssetHost;
use crate::images::HostedImage;

/// Filesystem-backed asset host.
///
/// Images are written to `{root}/{public_id}.{ext}` and served by the
/// application under `{public_base_url}/{public_id}.{ext}`.
pub struct FilesystemAssetHost {
    root: PathBuf,
    public_base_url: String,
    max_size: u64,
}

impl FilesystemAssetHost {
    /// Create a new filesystem asset host, creating `root` if needed.
    pub async fn new(
        root: PathBuf,
        public_base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, AssetError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_size,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl AssetHost for FilesystemAssetHost {
    async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<HostedImage, AssetError> {
        if data.len() as u64 > self.max_size {
            return Err(AssetError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let ext = image_extension(filename)?;
        let public_id = new_public_id(folder);
        validate_public_id(&public_id)?;

        let relative = format!("{public_id}.{ext}");
        let target = self.root.join(&relative);

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(HostedImage {
            url: format!("{}/{}", self.public_base_url, relative),
            public_id: Some(public_id),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<bool, AssetError> {
        validate_public_id(public_id)?;

        let (dir, stem) = match public_id.rsplit_once('/') {
            Some((dir, stem)) => (self.root.join(dir), stem),
            None => (self.root.clone(), public_id),
        };

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        // The identifier carries no extension, so match on the file stem.
        let mut removed = false;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let matches = name == stem
                || name
                    .strip_prefix(stem)
                    .is_some_and(|rest| rest.starts_with('.') && !rest[1..].contains('.'));
            if !matches {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed = true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(removed)
    }
}
