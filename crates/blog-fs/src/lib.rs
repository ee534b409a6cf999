//! Filesystem layer for blogsync
//!
//! Provides path sanitization for untrusted strings, atomic local writes,
//! file timestamp helpers, the shared retry policy and settings-file loading.

pub mod config;
pub mod error;
pub mod io;
pub mod retry;
pub mod sanitize;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::FileStamp;
pub use retry::{Backoff, RetryPolicy};
pub use sanitize::{clean, is_image_file, sanitize_relative, sanitize_strict};
