//! Image store backends for blogsync
//!
//! An [`ImageStore`] knows which images already live on the remote host,
//! uploads local images that are missing there, and downloads remote images
//! that are missing locally. Two backends are provided:
//!
//! - [`ObjectStoreImages`]: a flat photo host. Images are identified by an
//!   escaped form of their relative path stored as the photo's file name.
//! - [`WebDavImages`]: a hierarchical WebDAV share mirroring the blog root.
//!   Images are identified by their literal relative path.

pub mod error;
pub mod identity;
pub mod object_store;
pub mod store;
pub mod webdav;

pub use error::{Error, Result};
pub use object_store::{ObjectStoreImages, Photo, PhotoService, SNAPAS_URL_PREFIX};
pub use store::ImageStore;
pub use webdav::{DavEntry, DavService, RemoteImage, WebDavImages};
