//! Timestamp comparison between local files and remote posts
//!
//! Filesystems and the blog service round timestamps differently, so a
//! difference of up to [`SKEW_TOLERANCE_MS`] in either direction counts as
//! "same time" and triggers no transfer.

use chrono::{DateTime, Utc};

/// Allowed difference between a local mtime and a remote `updated` stamp.
pub const SKEW_TOLERANCE_MS: i64 = 2000;

/// The remote post changed after the local file, beyond the tolerance.
pub fn remote_is_newer(local: DateTime<Utc>, remote: DateTime<Utc>) -> bool {
    (local - remote).num_milliseconds() < -SKEW_TOLERANCE_MS
}

/// The local file changed after the remote post, beyond the tolerance.
pub fn local_is_newer(local: DateTime<Utc>, remote: DateTime<Utc>) -> bool {
    (local - remote).num_milliseconds() > SKEW_TOLERANCE_MS
}
