//! Error types for blog-images

/// Result type for blog-images operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to an image host
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unsafe remote name or local I/O failure
    #[error(transparent)]
    Fs(#[from] blog_fs::Error),

    /// Network or authentication failure
    #[error("Image host transport error: {message}")]
    Transport { message: String },

    #[error("Not found on image host: {what}")]
    NotFound { what: String },

    /// The image host answered with something we could not understand
    #[error("Malformed image host response: {message}")]
    Decode { message: String },
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
}
