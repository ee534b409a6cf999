//! Flat photo host backend (Snap.as style)

use std::collections::HashMap;
use std::path::PathBuf;

use blog_content::LocalImage;
use blog_fs::{RetryPolicy, io, sanitize_strict};
use serde::Deserialize;
use url::Url;

use crate::identity;
use crate::store::ImageStore;
use crate::{Error, Result};

/// Public URL prefix of images served by Snap.as.
pub const SNAPAS_URL_PREFIX: &str = "https://i.snap.as/";

/// A photo as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub size: u64,
}

/// Remote operations a flat photo host offers.
pub trait PhotoService {
    fn list_photos(&self) -> Result<Vec<Photo>>;

    /// Upload `bytes` under the file name `tag`.
    fn upload_photo(&self, bytes: Vec<u8>, tag: &str) -> Result<Photo>;

    /// Fetch the content behind a public photo URL.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`ImageStore`] over a [`PhotoService`].
///
/// Photos are indexed twice: by public URL, and by file name. Our own
/// uploads carry the escaped relative path as file name, so a previously
/// uploaded image is found again without any local cache.
pub struct ObjectStoreImages<S> {
    service: S,
    root: PathBuf,
    url_prefix: String,
    retry: RetryPolicy,
    by_url: HashMap<String, Photo>,
    by_name: HashMap<String, Photo>,
}

impl<S: PhotoService> ObjectStoreImages<S> {
    pub fn new(service: S, root: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self::with_url_prefix(service, root, retry, SNAPAS_URL_PREFIX)
    }

    pub fn with_url_prefix(
        service: S,
        root: impl Into<PathBuf>,
        retry: RetryPolicy,
        url_prefix: impl Into<String>,
    ) -> Self {
        Self {
            service,
            root: root.into(),
            url_prefix: url_prefix.into(),
            retry,
            by_url: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Number of photos currently indexed.
    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }

    fn index(&mut self, photo: Photo) {
        if !photo.filename.is_empty() {
            self.by_name.insert(photo.filename.clone(), photo.clone());
        }
        self.by_url.insert(photo.url.clone(), photo);
    }

    fn existing(&self, tag: &str, image: &LocalImage) -> Option<&Photo> {
        self.by_name.get(tag).or_else(|| {
            let basename = image.rel_path.rsplit('/').next().unwrap_or(&image.rel_path);
            self.by_url.get(&format!("{}{}", self.url_prefix, basename))
        })
    }

    /// Local root-relative path for a photo URL of ours.
    fn local_path_for(&self, url: &str, date_part: &str, slug: &str) -> Result<String> {
        if let Some(photo) = self.by_url.get(url)
            && let Some(decoded) = identity::decode(&photo.filename)
        {
            return Ok(sanitize_strict(&decoded)?);
        }

        let parsed = Url::parse(url).map_err(|e| Error::decode(format!("{url}: {e}")))?;
        let basename = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::decode(format!("no file name in image URL {url}")))?;

        Ok(sanitize_strict(&format!("{date_part}-{slug}/{basename}"))?)
    }
}

impl<S: PhotoService> ImageStore for ObjectStoreImages<S> {
    fn build_index(&mut self) -> Result<()> {
        let photos = self
            .retry
            .run("list photos", || self.service.list_photos())?;

        self.by_url.clear();
        self.by_name.clear();
        for photo in photos {
            self.index(photo);
        }

        tracing::info!(photos = self.by_url.len(), "Indexed remote photos");
        Ok(())
    }

    fn ensure_uploaded(&mut self, image: &LocalImage) -> Result<String> {
        let tag = identity::encode(&image.rel_path);

        if let Some(photo) = self.existing(&tag, image) {
            tracing::debug!(path = %image.rel_path, url = %photo.url, "Image already uploaded");
            return Ok(photo.url.clone());
        }

        let bytes = io::read_bytes(&image.full_path)?;
        let mut photo = self
            .retry
            .run("upload photo", || self.service.upload_photo(bytes.clone(), &tag))?;

        photo.size = image.size;
        if photo.filename.is_empty() {
            photo.filename = tag;
        }

        tracing::warn!(path = %image.rel_path, url = %photo.url, "Uploaded image");
        let url = photo.url.clone();
        self.index(photo);
        Ok(url)
    }

    fn ensure_downloaded(
        &mut self,
        url: &str,
        date_part: &str,
        slug: &str,
    ) -> Result<Option<String>> {
        if !url.starts_with(&self.url_prefix) {
            return Ok(None);
        }

        let rel = self.local_path_for(url, date_part, slug)?;
        let full_path = self.root.join(&rel);

        if io::stamp_if_file(&full_path)?.is_some() {
            tracing::debug!(path = %rel, "Image already present locally");
            return Ok(Some(rel));
        }

        let bytes = self.retry.run("fetch photo", || self.service.fetch(url))?;
        io::write_atomic(&full_path, &bytes)?;

        tracing::info!(path = %rel, url, "Downloaded image");
        Ok(Some(rel))
    }
}
