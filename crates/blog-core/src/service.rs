//! The remote blog seam

use crate::Result;
use crate::model::{NewPost, PostUpdate, RemotePost};

/// Operations the engine needs from a blog service.
///
/// Implementations map their failures onto [`Error::Transport`],
/// [`Error::NotFound`] and [`Error::Decode`](crate::Error::Decode); the engine
/// retries every call through its retry policy.
///
/// [`Error::Transport`]: crate::Error::Transport
/// [`Error::NotFound`]: crate::Error::NotFound
pub trait BlogService {
    /// One page of a collection's posts; pages are 1-based and an empty page
    /// marks the end.
    fn list_posts(&self, collection: &str, page: u32) -> Result<Vec<RemotePost>>;

    fn create_post(&self, collection: &str, post: &NewPost) -> Result<RemotePost>;

    fn update_post(&self, id: &str, update: &PostUpdate) -> Result<RemotePost>;
}

impl<T: BlogService + ?Sized> BlogService for Box<T> {
    fn list_posts(&self, collection: &str, page: u32) -> Result<Vec<RemotePost>> {
        (**self).list_posts(collection, page)
    }

    fn create_post(&self, collection: &str, post: &NewPost) -> Result<RemotePost> {
        (**self).create_post(collection, post)
    }

    fn update_post(&self, id: &str, update: &PostUpdate) -> Result<RemotePost> {
        (**self).update_post(id, update)
    }
}
