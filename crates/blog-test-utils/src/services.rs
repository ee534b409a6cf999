//! In-memory fakes of the remote collaborators.
//!
//! Each fake is cheap to clone and every clone shares state, so a test can
//! hand one clone to the code under test and inspect calls through another.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use blog_core::{BlogService, NewPost, PostUpdate, RemotePost};
use blog_images::{DavEntry, DavService, Photo, PhotoService};
use chrono::{DateTime, Utc};

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Consume one injected failure, if any are pending.
fn take_failure(pending: &mut u32) -> bool {
    if *pending > 0 {
        *pending -= 1;
        true
    } else {
        false
    }
}

/// Build a remote post.
pub fn remote_post(
    id: &str,
    slug: &str,
    title: &str,
    body: &str,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
) -> RemotePost {
    RemotePost {
        id: id.to_string(),
        slug: slug.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        created,
        updated,
    }
}

// ---------------------------------------------------------------------------
// Blog service
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct BlogState {
    posts: Vec<RemotePost>,
    page_size: usize,
    missing: bool,
    failures: u32,
    list_calls: u32,
    created: Vec<NewPost>,
    updates: Vec<(String, PostUpdate)>,
}

/// Fake blog service holding one collection.
#[derive(Debug, Clone)]
pub struct FakeBlog {
    state: Arc<Mutex<BlogState>>,
}

impl Default for FakeBlog {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBlog {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BlogState {
                page_size: 10,
                ..Default::default()
            })),
        }
    }

    pub fn with_post(self, post: RemotePost) -> Self {
        lock(&self.state).posts.push(post);
        self
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        lock(&self.state).page_size = page_size.max(1);
        self
    }

    /// Answer every listing with not-found.
    pub fn without_collection(self) -> Self {
        lock(&self.state).missing = true;
        self
    }

    /// Fail the next `count` calls with a transport error.
    pub fn failing(self, count: u32) -> Self {
        lock(&self.state).failures = count;
        self
    }

    pub fn posts(&self) -> Vec<RemotePost> {
        lock(&self.state).posts.clone()
    }

    pub fn post(&self, slug: &str) -> Option<RemotePost> {
        lock(&self.state).posts.iter().find(|p| p.slug == slug).cloned()
    }

    pub fn created(&self) -> Vec<NewPost> {
        lock(&self.state).created.clone()
    }

    pub fn updates(&self) -> Vec<(String, PostUpdate)> {
        lock(&self.state).updates.clone()
    }

    pub fn list_calls(&self) -> u32 {
        lock(&self.state).list_calls
    }

    /// Number of create and update calls.
    pub fn writes(&self) -> usize {
        let state = lock(&self.state);
        state.created.len() + state.updates.len()
    }
}

impl BlogService for FakeBlog {
    fn list_posts(&self, collection: &str, page: u32) -> blog_core::Result<Vec<RemotePost>> {
        let mut state = lock(&self.state);
        state.list_calls += 1;
        if take_failure(&mut state.failures) {
            return Err(blog_core::Error::transport("connection reset"));
        }
        if state.missing {
            return Err(blog_core::Error::not_found(format!("collection {collection}")));
        }

        let start = (page.max(1) as usize - 1) * state.page_size;
        Ok(state
            .posts
            .iter()
            .skip(start)
            .take(state.page_size)
            .cloned()
            .collect())
    }

    fn create_post(&self, _collection: &str, post: &NewPost) -> blog_core::Result<RemotePost> {
        let mut state = lock(&self.state);
        if take_failure(&mut state.failures) {
            return Err(blog_core::Error::transport("connection reset"));
        }

        let created = remote_post(
            &format!("post-{}", state.posts.len() + 1),
            &post.slug,
            &post.title,
            &post.body,
            post.created,
            Utc::now(),
        );
        state.created.push(post.clone());
        state.posts.push(created.clone());
        Ok(created)
    }

    fn update_post(&self, id: &str, update: &PostUpdate) -> blog_core::Result<RemotePost> {
        let mut state = lock(&self.state);
        if take_failure(&mut state.failures) {
            return Err(blog_core::Error::transport("connection reset"));
        }

        state.updates.push((id.to_string(), update.clone()));
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| blog_core::Error::not_found(format!("post {id}")))?;
        post.title = update.title.clone();
        post.body = update.body.clone();
        post.updated = update.updated;
        Ok(post.clone())
    }
}

// ---------------------------------------------------------------------------
// Flat photo host
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct PhotoState {
    url_prefix: String,
    photos: Vec<Photo>,
    blobs: HashMap<String, Vec<u8>>,
    uploads: Vec<String>,
    fetches: Vec<String>,
    failures: u32,
}

/// Fake flat photo host serving URLs under a fixed prefix.
#[derive(Debug, Clone)]
pub struct FakePhotos {
    state: Arc<Mutex<PhotoState>>,
}

impl Default for FakePhotos {
    fn default() -> Self {
        Self::new(blog_images::SNAPAS_URL_PREFIX)
    }
}

impl FakePhotos {
    pub fn new(url_prefix: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(PhotoState {
                url_prefix: url_prefix.to_string(),
                ..Default::default()
            })),
        }
    }

    /// Add a photo served at `<prefix><url_name>` with the given file name.
    pub fn with_photo(self, filename: &str, url_name: &str, bytes: &[u8]) -> Self {
        {
            let mut state = lock(&self.state);
            let url = format!("{}{url_name}", state.url_prefix);
            let id = format!("photo-{}", state.photos.len() + 1);
            state.photos.push(Photo {
                id,
                url: url.clone(),
                filename: filename.to_string(),
                size: bytes.len() as u64,
            });
            state.blobs.insert(url, bytes.to_vec());
        }
        self
    }

    /// Fail the next `count` calls with a transport error.
    pub fn failing(self, count: u32) -> Self {
        lock(&self.state).failures = count;
        self
    }

    /// Tags of every upload, in call order.
    pub fn uploads(&self) -> Vec<String> {
        lock(&self.state).uploads.clone()
    }

    /// URLs of every fetch, in call order.
    pub fn fetches(&self) -> Vec<String> {
        lock(&self.state).fetches.clone()
    }

    pub fn photos(&self) -> Vec<Photo> {
        lock(&self.state).photos.clone()
    }
}

impl PhotoService for FakePhotos {
    fn list_photos(&self) -> blog_images::Result<Vec<Photo>> {
        let mut state = lock(&self.state);
        if take_failure(&mut state.failures) {
            return Err(blog_images::Error::transport("connection reset"));
        }
        Ok(state.photos.clone())
    }

    fn upload_photo(&self, bytes: Vec<u8>, tag: &str) -> blog_images::Result<Photo> {
        let mut state = lock(&self.state);
        if take_failure(&mut state.failures) {
            return Err(blog_images::Error::transport("connection reset"));
        }

        let n = state.photos.len() + 1;
        let extension = tag.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("png");
        let url = format!("{}u{n}.{extension}", state.url_prefix);
        let photo = Photo {
            id: format!("photo-{n}"),
            url: url.clone(),
            filename: tag.to_string(),
            // Hosts report the size of their re-encoded copy.
            size: bytes.len() as u64 + 1,
        };
        state.uploads.push(tag.to_string());
        state.photos.push(photo.clone());
        state.blobs.insert(url, bytes);
        Ok(photo)
    }

    fn fetch(&self, url: &str) -> blog_images::Result<Vec<u8>> {
        let mut state = lock(&self.state);
        if take_failure(&mut state.failures) {
            return Err(blog_images::Error::transport("connection reset"));
        }
        state.fetches.push(url.to_string());
        state.blobs.get(url).cloned().ok_or(blog_images::Error::NotFound {
            what: url.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// WebDAV share
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct DavFile {
    bytes: Vec<u8>,
    modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct DavState {
    files: BTreeMap<String, DavFile>,
    /// Listings returned verbatim instead of being derived from `files`.
    listings: HashMap<String, Vec<DavEntry>>,
    writes: Vec<String>,
    reads: Vec<String>,
    stats: Vec<String>,
}

/// Fake WebDAV share; directories are implied by file paths.
#[derive(Debug, Clone, Default)]
pub struct FakeDav {
    state: Arc<Mutex<DavState>>,
}

impl FakeDav {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, bytes: &[u8], modified: Option<DateTime<Utc>>) -> Self {
        lock(&self.state).files.insert(
            path.to_string(),
            DavFile {
                bytes: bytes.to_vec(),
                modified,
            },
        );
        self
    }

    /// Serve `entries` verbatim when `dir` is listed.
    pub fn with_listing(self, dir: &str, entries: Vec<DavEntry>) -> Self {
        lock(&self.state).listings.insert(dir.to_string(), entries);
        self
    }

    pub fn writes(&self) -> Vec<String> {
        lock(&self.state).writes.clone()
    }

    pub fn reads(&self) -> Vec<String> {
        lock(&self.state).reads.clone()
    }

    pub fn stats(&self) -> Vec<String> {
        lock(&self.state).stats.clone()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.state).files.get(path).map(|f| f.bytes.clone())
    }
}

impl DavService for FakeDav {
    fn list_directory(&self, path: &str) -> blog_images::Result<Vec<DavEntry>> {
        let state = lock(&self.state);
        if let Some(entries) = state.listings.get(path) {
            return Ok(entries.clone());
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        let mut entries: BTreeMap<String, DavEntry> = BTreeMap::new();
        for (file_path, file) in &state.files {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            let entry = match rest.split_once('/') {
                Some((dir, _)) => DavEntry {
                    name: dir.to_string(),
                    is_dir: true,
                    size: 0,
                    modified: None,
                },
                None => DavEntry {
                    name: rest.to_string(),
                    is_dir: false,
                    size: file.bytes.len() as u64,
                    modified: file.modified,
                },
            };
            entries.entry(entry.name.clone()).or_insert(entry);
        }
        Ok(entries.into_values().collect())
    }

    fn read_file(&self, path: &str) -> blog_images::Result<Vec<u8>> {
        let mut state = lock(&self.state);
        state.reads.push(path.to_string());
        state
            .files
            .get(path)
            .map(|f| f.bytes.clone())
            .ok_or(blog_images::Error::NotFound {
                what: path.to_string(),
            })
    }

    fn write_file(&self, path: &str, bytes: &[u8]) -> blog_images::Result<()> {
        let mut state = lock(&self.state);
        state.writes.push(path.to_string());
        state.files.insert(
            path.to_string(),
            DavFile {
                bytes: bytes.to_vec(),
                modified: Some(Utc::now()),
            },
        );
        Ok(())
    }

    fn stat(&self, path: &str) -> blog_images::Result<DavEntry> {
        let mut state = lock(&self.state);
        state.stats.push(path.to_string());
        let file = state.files.get(path).ok_or(blog_images::Error::NotFound {
            what: path.to_string(),
        })?;
        Ok(DavEntry {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            is_dir: false,
            size: file.bytes.len() as u64,
            modified: file.modified,
        })
    }
}
