use common::{HostedImage, ImageRef};

use crate::utils::filename::{file_stem, url_path_segments};

/// Identifiers to destroy once a record mutation has committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupPlan {
    /// Provider identifiers, de-duplicated, in first-seen order.
    pub public_ids: Vec<String>,
    /// URLs no identifier could be derived for; they stay in storage.
    pub skipped: Vec<String>,
}

impl CleanupPlan {
    /// Plan deletion of every image in `images`.
    pub fn for_images<'a>(images: impl IntoIterator<Item = &'a ImageRef>, folder: &str) -> Self {
        let mut plan = Self::default();
        for image in images {
            match public_id_for(image, folder) {
                Some(id) => {
                    if !plan.public_ids.contains(&id) {
                        plan.public_ids.push(id);
                    }
                }
                None => plan.skipped.push(image.url().to_string()),
            }
        }
        plan
    }

    /// Plan deletion of the images in `old` that `new` no longer contains.
    ///
    /// An identifier that some image in `new` still resolves to is kept, so a
    /// hosted image re-sent as its bare URL survives.
    pub fn for_update(old: &[ImageRef], new: &[ImageRef], folder: &str) -> Self {
        let mut plan = Self::for_images(removed_images(old, new), folder);
        let kept: Vec<String> = new
            .iter()
            .filter_map(|image| public_id_for(image, folder))
            .collect();
        plan.public_ids.retain(|id| !kept.contains(id));
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.public_ids.is_empty()
    }
}

/// Images present in `old` but absent from `new`, compared structurally.
pub fn removed_images<'a>(old: &'a [ImageRef], new: &[ImageRef]) -> Vec<&'a ImageRef> {
    old.iter().filter(|image| !new.contains(image)).collect()
}

/// A record's image list plus its featured image, unless the featured image
/// is already one of the listed images.
pub fn with_featured(mut images: Vec<ImageRef>, featured: Option<ImageRef>) -> Vec<ImageRef> {
    if let Some(featured) = featured
        && !images.contains(&featured)
    {
        images.push(featured);
    }
    images
}

/// The provider identifier that deletes `image`, if one is known or derivable.
pub fn public_id_for(image: &ImageRef, folder: &str) -> Option<String> {
    match image {
        ImageRef::Hosted(HostedImage {
            public_id: Some(id),
            ..
        }) if !id.trim().is_empty() => Some(id.clone()),
        ImageRef::Hosted(hosted) => legacy_public_id(&hosted.url, folder),
        ImageRef::Legacy(url) => legacy_public_id(url, folder),
    }
}

/// Derive `{folder}/{stem}` from a bare URL that was uploaded into `folder`.
///
/// Only URLs whose path passes through `folder` qualify, so stock photos and
/// other third-party links are never mapped onto a stored asset.
pub fn legacy_public_id(url: &str, folder: &str) -> Option<String> {
    let segments = url_path_segments(url)?;
    let (last, parents) = segments.split_last()?;
    if !parents.contains(&folder) {
        return None;
    }
    let stem = file_stem(last)?;
    Some(format!("{folder}/{stem}"))
}
