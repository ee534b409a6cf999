//! Hierarchical WebDAV backend
//!
//! The share mirrors the blog root: an image referenced as `img/cat.png` is
//! stored at `img/cat.png` below the configured remote directory and served
//! at `<published url>/img/cat.png`.

use std::collections::HashMap;
use std::path::PathBuf;

use blog_content::LocalImage;
use blog_fs::{FileStamp, RetryPolicy, io, sanitize_strict};
use chrono::{DateTime, Utc};

use crate::Result;
use crate::store::ImageStore;

/// One entry of a directory listing or a stat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavEntry {
    /// Single path segment, as reported by the server.
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    /// `None` when the server reports no usable modification time.
    pub modified: Option<DateTime<Utc>>,
}

/// Remote operations a WebDAV share offers.
///
/// Paths are slash-separated and relative to the share's configured root;
/// the empty string denotes the root itself.
pub trait DavService {
    fn list_directory(&self, path: &str) -> Result<Vec<DavEntry>>;

    fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Write `bytes` to `path`, creating missing parent collections.
    fn write_file(&self, path: &str, bytes: &[u8]) -> Result<()>;

    fn stat(&self, path: &str) -> Result<DavEntry>;
}

/// An image known to exist on the share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteImage {
    /// Public URL the image is served at.
    pub url: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// [`ImageStore`] over a [`DavService`], keyed by relative path.
pub struct WebDavImages<S> {
    service: S,
    root: PathBuf,
    published_url: String,
    retry: RetryPolicy,
    index: HashMap<String, RemoteImage>,
}

impl<S: DavService> WebDavImages<S> {
    pub fn new(
        service: S,
        root: impl Into<PathBuf>,
        published_url: &str,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            service,
            root: root.into(),
            published_url: published_url.trim_end_matches('/').to_string(),
            retry,
            index: HashMap::new(),
        }
    }

    /// Indexed image for a relative path.
    pub fn get(&self, rel_path: &str) -> Option<&RemoteImage> {
        self.index.get(rel_path)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn url_for(&self, rel_path: &str) -> String {
        format!("{}/{}", self.published_url, rel_path)
    }

    fn walk(&mut self, dir: &str) -> Result<()> {
        let entries = self
            .retry
            .run("list directory", || self.service.list_directory(dir))?;

        for entry in entries {
            let name = sanitize_strict(&entry.name).inspect_err(|e| {
                tracing::error!(dir, name = %entry.name, error = %e, "Malicious name on image host");
            })?;
            let rel = if dir.is_empty() {
                name
            } else {
                format!("{dir}/{name}")
            };

            if entry.is_dir {
                self.walk(&rel)?;
            } else {
                let image = RemoteImage {
                    url: self.url_for(&rel),
                    size: entry.size,
                    modified: entry.modified,
                };
                self.index.insert(rel, image);
            }
        }
        Ok(())
    }

    /// The remote side of `rel`, from the index or a fresh stat.
    fn remote(&self, rel: &str) -> Result<RemoteImage> {
        if let Some(image) = self.index.get(rel) {
            return Ok(image.clone());
        }
        let entry = self.retry.run("stat", || self.service.stat(rel))?;
        Ok(RemoteImage {
            url: self.url_for(rel),
            size: entry.size,
            modified: entry.modified,
        })
    }
}

/// Whether a local copy makes the download unnecessary.
///
/// A remote entry without a modification time never wins over a local file.
fn local_is_current(local: &FileStamp, remote: &RemoteImage) -> bool {
    if local.size == remote.size {
        return true;
    }
    match remote.modified {
        Some(remote_modified) => local.modified > remote_modified,
        None => true,
    }
}

impl<S: DavService> ImageStore for WebDavImages<S> {
    fn build_index(&mut self) -> Result<()> {
        self.index.clear();
        self.walk("")?;
        tracing::info!(images = self.index.len(), "Indexed WebDAV images");
        Ok(())
    }

    fn ensure_uploaded(&mut self, image: &LocalImage) -> Result<String> {
        let rel = sanitize_strict(&image.rel_path)?;

        if let Some(remote) = self.index.get(&rel) {
            let not_older = remote.modified.is_none_or(|m| m >= image.modified);
            if remote.size == image.size && not_older {
                tracing::debug!(path = %rel, "Image already uploaded");
                return Ok(remote.url.clone());
            }
        }

        let bytes = io::read_bytes(&image.full_path)?;
        self.retry
            .run("write file", || self.service.write_file(&rel, &bytes))?;

        let url = self.url_for(&rel);
        tracing::warn!(path = %rel, url = %url, "Uploaded image");
        self.index.insert(
            rel,
            RemoteImage {
                url: url.clone(),
                size: image.size,
                modified: Some(image.modified),
            },
        );
        Ok(url)
    }

    fn ensure_downloaded(
        &mut self,
        url: &str,
        _date_part: &str,
        _slug: &str,
    ) -> Result<Option<String>> {
        let Some(stripped) = url
            .strip_prefix(self.published_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return Ok(None);
        };

        let rel = sanitize_strict(stripped)?;
        let full_path = self.root.join(&rel);
        let remote = self.remote(&rel)?;

        if let Some(local) = io::stamp_if_file(&full_path)?
            && local_is_current(&local, &remote)
        {
            tracing::debug!(path = %rel, "Local image is current");
            return Ok(Some(rel));
        }

        let bytes = self.retry.run("read file", || self.service.read_file(&rel))?;
        io::write_atomic(&full_path, &bytes)?;
        if let Some(modified) = remote.modified {
            io::set_modified(&full_path, modified)?;
        }

        tracing::info!(path = %rel, url, "Downloaded image");
        self.index.insert(rel.clone(), remote);
        Ok(Some(rel))
    }
}
