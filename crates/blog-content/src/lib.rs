//! Markdown post handling for blogsync
//!
//! Recognizes post files by name, extracts titles and image references from
//! Markdown, and rewrites image links between local paths and remote URLs.

pub mod error;
pub mod post_file;
pub mod rewrite;
pub mod scanner;

pub use error::{Error, Result};
pub use post_file::{POST_FILE_PATTERN, PostFileName};
pub use rewrite::{LinkMap, prepend_title, replace_spans, rewrite_links, strip_discuss_footer};
pub use scanner::{LocalImage, ScannedPost, scan, scan_for_download};
