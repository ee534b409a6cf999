//! Shared test utilities for the blogsync workspace.
//!
//! It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`services`]: in-memory fakes of the blog, photo host and WebDAV share
//! - [`blog`]: [`TestBlog`](blog::TestBlog) temporary blog-root builder

pub mod blog;
pub mod services;

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp.
///
/// # Panics
/// Panics on malformed input.
pub fn utc(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap_or_else(|e| panic!("utc: bad timestamp {rfc3339:?}: {e}"))
        .with_timezone(&Utc)
}
