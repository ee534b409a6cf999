//! Error types for blog-core

/// Result type for blog-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a sync run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network or authentication failure talking to the blog service
    #[error("Blog service transport error: {message}")]
    Transport { message: String },

    /// The collection (or another remote resource) does not exist
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// The blog service answered with something we could not understand
    #[error("Malformed blog service response: {message}")]
    Decode { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem or path error from blog-fs
    #[error(transparent)]
    Fs(#[from] blog_fs::Error),

    /// Post parsing error from blog-content
    #[error(transparent)]
    Content(#[from] blog_content::Error),

    /// Image host error from blog-images
    #[error(transparent)]
    Images(#[from] blog_images::Error),
}

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}
