use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use super::error::AssetError;
use super::naming::{image_extension, new_public_id, validate_public_id};
use super::traits::AssetHost;
use crate::images::HostedImage;

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, R2, ...). `None` uses AWS.
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
    /// Base URL images are publicly reachable under.
    pub public_base_url: String,
    pub max_size: u64,
}

/// Asset host backed by an S3-compatible bucket.
///
/// Objects are stored under `{public_id}.{ext}`.
pub struct S3AssetHost {
    bucket: Box<Bucket>,
    public_base_url: String,
    max_size: u64,
}

impl S3AssetHost {
    pub fn new(settings: S3Settings) -> Result<Self, AssetError> {
        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AssetError::Remote(format!("invalid credentials: {e}")))?;

        let region = match settings.endpoint {
            Some(endpoint) => Region::Custom {
                region: settings.region,
                endpoint,
            },
            None => settings
                .region
                .parse()
                .map_err(|e| AssetError::Remote(format!("invalid region: {e}")))?,
        };

        let mut bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| AssetError::Remote(e.to_string()))?;
        if settings.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            public_base_url: settings.public_base_url.trim_end_matches('/').to_string(),
            max_size: settings.max_size,
        })
    }
}

fn content_type(ext: &str) -> mime_guess::Mime {
    mime_guess::from_ext(ext).first_or_octet_stream()
}

#[async_trait]
impl AssetHost for S3AssetHost {
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
        let key = format!("{public_id}.{ext}");

        let response = self
            .bucket
            .put_object_with_content_type(&key, &data, content_type(&ext).as_ref())
            .await
            .map_err(|e| AssetError::Remote(e.to_string()))?;
        if !(200..300).contains(&response.status_code()) {
            return Err(AssetError::Remote(format!(
                "upload of {key} returned status {}",
                response.status_code()
            )));
        }

        Ok(HostedImage {
            url: format!("{}/{}", self.public_base_url, key),
            public_id: Some(public_id),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<bool, AssetError> {
        validate_public_id(public_id)?;

        let listing = self
            .bucket
            .list(format!("{public_id}."), None)
            .await
            .map_err(|e| AssetError::Remote(e.to_string()))?;

        let mut removed = false;
        for object in listing.into_iter().flat_map(|page| page.contents) {
            let response = self
                .bucket
                .delete_object(&object.key)
                .await
                .map_err(|e| AssetError::Remote(e.to_string()))?;
            match response.status_code() {
                200..=299 => removed = true,
                404 => {}
                status => {
                    return Err(AssetError::Remote(format!(
                        "delete of {} returned status {status}",
                        object.key
                    )));
                }
            }
        }

        Ok(removed)
    }
}
