//! Local and remote post representations

use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blog_content::LocalImage;

/// A post file found under the blog root.
///
/// Captured once at the start of a run and not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPost {
    pub file_name: String,
    pub date_part: String,
    pub slug: String,
    /// Local images referenced by the post, in document order.
    pub images: Vec<LocalImage>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Raw Markdown source.
    pub content: String,
    /// First level-1 heading, or empty.
    pub title: String,
    /// Source lines holding the title heading.
    pub title_span: Option<Range<usize>>,
}

/// A post as listed by the blog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Parameters for publishing a new post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
}

/// Parameters for replacing an existing post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostUpdate {
    pub title: String,
    pub body: String,
    pub updated: DateTime<Utc>,
}
