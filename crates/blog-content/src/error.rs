//! Error types for blog-content

/// Result type for blog-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blog-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Path rejected by the sanitizer, or a failed stat/read
    #[error(transparent)]
    Fs(#[from] blog_fs::Error),

    #[error("Invalid post date {value:?}")]
    InvalidDate { value: String },
}
