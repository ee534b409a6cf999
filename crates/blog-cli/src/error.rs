//! Error types for blog-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from blog-core
    #[error(transparent)]
    Core(#[from] blog_core::Error),

    /// Error from blog-images
    #[error(transparent)]
    Images(#[from] blog_images::Error),

    /// Error from blog-fs
    #[error(transparent)]
    Fs(#[from] blog_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Logging could not be set up
    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
