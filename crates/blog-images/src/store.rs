//! The capability shared by all image backends

use blog_content::LocalImage;

use crate::Result;

/// A remote home for the images referenced by posts.
///
/// Implementations keep an in-memory index of the remote side that is filled
/// by [`build_index`](ImageStore::build_index) and kept current by the other
/// two methods, so repeated calls within one run are cheap and idempotent.
pub trait ImageStore {
    /// Enumerate everything already present remotely.
    ///
    /// Must be called once per run before any other method.
    fn build_index(&mut self) -> Result<()>;

    /// Make sure `image` exists remotely and return its public URL.
    ///
    /// Uploads only when the image is not already known to the host.
    fn ensure_uploaded(&mut self, image: &LocalImage) -> Result<String>;

    /// Make sure the image at `url` exists under the blog root.
    ///
    /// Returns the root-relative path to link to, or `None` when the URL does
    /// not belong to this store and the link should be left untouched.
    /// `date_part` and `slug` identify the post the image appears in.
    fn ensure_downloaded(&mut self, url: &str, date_part: &str, slug: &str)
    -> Result<Option<String>>;
}

impl<T: ImageStore + ?Sized> ImageStore for Box<T> {
    fn build_index(&mut self) -> Result<()> {
        (**self).build_index()
    }

    fn ensure_uploaded(&mut self, image: &LocalImage) -> Result<String> {
        (**self).ensure_uploaded(image)
    }

    fn ensure_downloaded(
        &mut self,
        url: &str,
        date_part: &str,
        slug: &str,
    ) -> Result<Option<String>> {
        (**self).ensure_downloaded(url, date_part, slug)
    }
}
