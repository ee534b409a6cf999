//! SyncEngine implementation
//!
//! A run has four phases:
//! 1. index the image host and discover local post files
//! 2. page through the remote collection
//! 3. (download) write new or remotely changed posts to disk
//! 4. (upload) push local images, then new or locally changed posts

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::path::{Path, PathBuf};

use blog_content::{
    LinkMap, PostFileName, prepend_title, replace_spans, rewrite_links, scan, scan_for_download,
    strip_discuss_footer,
};
use blog_fs::{RetryPolicy, io, sanitize_strict};
use blog_images::ImageStore;

use super::freshness::{local_is_newer, remote_is_newer};
use super::report::SyncReport;
use crate::model::{LocalPost, NewPost, PostUpdate, RemotePost};
use crate::service::BlogService;
use crate::{Error, Result};

/// Which directions a run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub download: bool,
    pub upload: bool,
}

impl SyncOptions {
    pub fn both() -> Self {
        Self {
            download: true,
            upload: true,
        }
    }

    pub fn download_only() -> Self {
        Self {
            download: true,
            upload: false,
        }
    }

    pub fn upload_only() -> Self {
        Self {
            download: false,
            upload: true,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::both()
    }
}

/// Engine reconciling a local blog root with a remote collection.
///
/// The phases can be driven one by one, or all at once through
/// [`run`](SyncEngine::run). Local posts are captured once and not refreshed
/// after the download phase.
pub struct SyncEngine<B, I> {
    root: PathBuf,
    collection: String,
    blog: B,
    images: I,
    retry: RetryPolicy,
    /// Local posts keyed by slug
    posts: BTreeMap<String, LocalPost>,
    /// Remote posts in listing order
    remote: Vec<RemotePost>,
}

impl<B: BlogService, I: ImageStore> SyncEngine<B, I> {
    pub fn new(
        root: impl Into<PathBuf>,
        collection: impl Into<String>,
        blog: B,
        images: I,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            root: root.into(),
            collection: collection.into(),
            blog,
            images,
            retry,
            posts: BTreeMap::new(),
            remote: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn local_posts(&self) -> &BTreeMap<String, LocalPost> {
        &self.posts
    }

    pub fn remote_posts(&self) -> &[RemotePost] {
        &self.remote
    }

    /// Run the phases selected by `options` and report what changed.
    ///
    /// # Errors
    ///
    /// Any error aborts the run; files and remote posts written before the
    /// failure stay in place.
    pub fn run(&mut self, options: SyncOptions) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        self.build_image_index()?;
        report.local_posts = self.discover_local_posts()?;
        report.remote_posts = self.load_remote_posts()?;

        if options.download {
            self.download_remote_posts(&mut report)?;
        }

        if options.upload {
            let links = self.upload_local_images()?;
            report.images_resolved = links.len();
            self.upload_local_posts(&links, &mut report)?;
        }

        tracing::info!(%report, "Sync finished");
        Ok(report)
    }

    pub fn build_image_index(&mut self) -> Result<()> {
        self.images.build_index()?;
        Ok(())
    }

    /// Read, scan and stat every post file directly under the root.
    ///
    /// Files are visited in name order; when two files share a slug the last
    /// one wins. Returns the number of distinct posts.
    pub fn discover_local_posts(&mut self) -> Result<usize> {
        let entries =
            std::fs::read_dir(&self.root).map_err(|e| blog_fs::Error::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| blog_fs::Error::io(&self.root, e))?;
            let path = entry.path();
            let is_file = match std::fs::metadata(&path) {
                Ok(meta) => meta.is_file(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "Skipping dangling link");
                    false
                }
                Err(e) => return Err(blog_fs::Error::io(&path, e).into()),
            };
            let name = entry.file_name();
            if is_file && let Some(name) = name.to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        self.posts.clear();
        for name in names {
            let Some(file) = PostFileName::parse(&name) else {
                continue;
            };

            let path = self.root.join(&name);
            let content = io::read_text(&path)?;
            let scanned = scan(&content, &self.root)?;
            let stamp = io::stamp(&path)?;

            tracing::debug!(slug = %file.slug, images = scanned.images.len(), "Found local post");
            self.posts.insert(
                file.slug.clone(),
                LocalPost {
                    file_name: name,
                    date_part: file.date_part,
                    slug: file.slug,
                    images: scanned.images,
                    created: stamp.created,
                    modified: stamp.modified,
                    content,
                    title: scanned.title,
                    title_span: scanned.title_span,
                },
            );
        }

        tracing::info!(posts = self.posts.len(), "Discovered local posts");
        Ok(self.posts.len())
    }

    /// Fetch all pages of the collection until an empty one.
    pub fn load_remote_posts(&mut self) -> Result<usize> {
        self.remote.clear();

        let mut page = 1;
        loop {
            tracing::info!(page, "Fetching a page of remote posts");
            let posts = self.retry.run("list posts", || {
                self.blog.list_posts(&self.collection, page)
            })?;
            if posts.is_empty() {
                break;
            }
            self.remote.extend(posts);
            page += 1;
        }

        tracing::info!(posts = self.remote.len(), "Loaded remote posts");
        Ok(self.remote.len())
    }

    /// Write remote posts that are new, or newer than their local file.
    pub fn download_remote_posts(&mut self, report: &mut SyncReport) -> Result<()> {
        for remote in &self.remote {
            let local = self.posts.get(&remote.slug);
            let date_part = match local {
                Some(local) if remote_is_newer(local.modified, remote.updated) => {
                    tracing::info!(slug = %remote.slug, "Post has been updated remotely, syncing locally");
                    local.date_part.clone()
                }
                Some(_) => continue,
                None => {
                    tracing::info!(slug = %remote.slug, "New remote post");
                    PostFileName::date_part_of(remote.created)
                }
            };

            let slug = post_slug(&remote.slug)?;
            let images = &mut self.images;
            let links = scan_for_download(&remote.body, |url| {
                images.ensure_downloaded(url, &date_part, &slug)
            })?;

            let content = prepend_title(
                &strip_discuss_footer(&rewrite_links(&remote.body, &links)),
                &remote.title,
            );

            let path = self.root.join(PostFileName::new(&date_part, &slug).file_name());
            io::write_atomic(&path, content.as_bytes())?;
            io::set_modified(&path, remote.updated)?;

            report.downloaded.push(slug);
        }
        Ok(())
    }

    /// Resolve every distinct local image reference to a remote URL.
    pub fn upload_local_images(&mut self) -> Result<LinkMap> {
        let mut links = LinkMap::new();
        for post in self.posts.values() {
            for image in &post.images {
                if links.contains_key(&image.reference) {
                    continue;
                }
                let url = self.images.ensure_uploaded(image)?;
                links.insert(image.reference.clone(), url);
            }
        }
        tracing::info!(images = links.len(), "Resolved local images");
        Ok(links)
    }

    /// Create or update remote posts from local files.
    ///
    /// `links` maps local image references to their remote URLs.
    pub fn upload_local_posts(&mut self, links: &LinkMap, report: &mut SyncReport) -> Result<()> {
        let remotes: HashMap<&str, &RemotePost> = self
            .remote
            .iter()
            .map(|post| (post.slug.as_str(), post))
            .collect();

        for local in self.posts.values() {
            let body = outgoing_body(local, links);

            match remotes.get(local.slug.as_str()) {
                None => {
                    tracing::info!(slug = %local.slug, "Uploading new local post");
                    let post = NewPost {
                        slug: local.slug.clone(),
                        title: local.title.clone(),
                        body,
                        created: PostFileName::new(&local.date_part, &local.slug).noon_utc()?,
                    };
                    self.retry.run("create post", || {
                        self.blog.create_post(&self.collection, &post)
                    })?;
                    report.created.push(local.slug.clone());
                }
                Some(remote) if local_is_newer(local.modified, remote.updated) => {
                    if remote.title == local.title && strip_discuss_footer(&remote.body) == body {
                        tracing::debug!(slug = %local.slug, "Local post touched but content unchanged");
                        report.unchanged += 1;
                        continue;
                    }

                    tracing::info!(slug = %local.slug, "Post has been updated locally, updating remotely");
                    let update = PostUpdate {
                        title: local.title.clone(),
                        body,
                        updated: local.modified,
                    };
                    self.retry
                        .run("update post", || self.blog.update_post(&remote.id, &update))?;
                    report.updated.push(local.slug.clone());
                }
                Some(_) => {
                    tracing::debug!(slug = %local.slug, "Post is up to date");
                    report.unchanged += 1;
                }
            }
        }
        Ok(())
    }
}

/// The body sent to the blog service: image links resolved, title heading removed.
fn outgoing_body(local: &LocalPost, links: &LinkMap) -> String {
    let mut edits: Vec<(Range<usize>, &str)> = local
        .images
        .iter()
        .filter_map(|image| {
            let span = image.span.clone()?;
            let url = links.get(&image.reference)?;
            Some((span, url.as_str()))
        })
        .collect();
    if let Some(span) = &local.title_span {
        edits.push((span.clone(), ""));
    }
    replace_spans(&local.content, edits)
}

/// A remote slug, checked to be a single safe file name segment.
fn post_slug(slug: &str) -> Result<String> {
    let slug = sanitize_strict(slug)?;
    if slug.contains(['/', '\\']) {
        return Err(Error::Fs(blog_fs::Error::unsafe_path(
            slug,
            "post slug must be a single path segment",
        )));
    }
    Ok(slug)
}
