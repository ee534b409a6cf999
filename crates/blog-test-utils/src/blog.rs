//! [`TestBlog`] builder for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::TempDir;

/// A temporary blog root with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use blog_test_utils::blog::TestBlog;
///
/// let blog = TestBlog::new();
/// blog.write_post("2024-03-01-hello.md", "# Hello\n\n![alt](img/cat.png)\n");
/// blog.write_image("img/cat.png", b"png");
/// blog.assert_file_exists("img/cat.png");
/// ```
pub struct TestBlog {
    temp_dir: TempDir,
}

impl Default for TestBlog {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBlog {
    /// Create an empty temporary blog root.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a post file directly under the root.
    pub fn write_post(&self, name: &str, content: &str) -> PathBuf {
        self.write_file(name, content.as_bytes())
    }

    /// Write an image, creating its directories.
    pub fn write_image(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        self.write_file(rel, bytes)
    }

    fn write_file(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("TestBlog: failed to create {}: {e}", parent.display()));
        }
        fs::write(&path, bytes)
            .unwrap_or_else(|e| panic!("TestBlog: failed to write {}: {e}", path.display()));
        path
    }

    /// Set the modification time of a file under the root.
    pub fn set_modified(&self, rel: &str, modified: DateTime<Utc>) {
        blog_fs::io::set_modified(&self.path(rel), modified)
            .unwrap_or_else(|e| panic!("TestBlog: failed to set mtime of {rel}: {e}"));
    }

    pub fn modified(&self, rel: &str) -> DateTime<Utc> {
        blog_fs::io::stamp(&self.path(rel))
            .unwrap_or_else(|e| panic!("TestBlog: failed to stat {rel}: {e}"))
            .modified
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("TestBlog: failed to read {rel}: {e}"))
    }

    pub fn read_bytes(&self, rel: &str) -> Vec<u8> {
        fs::read(self.path(rel)).unwrap_or_else(|e| panic!("TestBlog: failed to read {rel}: {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Assert a file exists under the root.
    pub fn assert_file_exists(&self, rel: &str) {
        assert!(self.exists(rel), "expected {rel} to exist under the blog root");
    }

    /// Assert a file does not exist under the root.
    pub fn assert_file_missing(&self, rel: &str) {
        assert!(!self.exists(rel), "expected {rel} to be absent from the blog root");
    }

    /// Names of all `.md` files directly under the root, sorted.
    pub fn post_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| name.ends_with(".md"))
            .collect();
        names.sort();
        names
    }
}
