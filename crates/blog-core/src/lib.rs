//! Synchronization engine for blogsync
//!
//! Reconciles a directory of `YYYY-MM-DD-<slug>.md` posts with a remote blog
//! collection and an image host. Conflicts are settled per post by
//! modification time, with remote changes applied before local ones.

pub mod error;
pub mod model;
pub mod service;
pub mod sync;

pub use error::{Error, Result};
pub use model::{LocalPost, NewPost, PostUpdate, RemotePost};
pub use service::BlogService;
pub use sync::{SKEW_TOLERANCE_MS, SyncEngine, SyncOptions, SyncReport};
