//! Summary of a sync run

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a sync run found and changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Post files discovered under the root
    pub local_posts: usize,
    /// Posts listed by the blog service
    pub remote_posts: usize,
    /// Slugs written to disk from the remote side
    pub downloaded: Vec<String>,
    /// Slugs published as new remote posts
    pub created: Vec<String>,
    /// Slugs whose remote post was replaced
    pub updated: Vec<String>,
    /// Local posts left untouched during upload
    pub unchanged: usize,
    /// Distinct local image references resolved to remote URLs
    pub images_resolved: usize,
}

impl SyncReport {
    /// Whether the run wrote nothing on either side.
    pub fn is_noop(&self) -> bool {
        self.downloaded.is_empty() && self.created.is_empty() && self.updated.is_empty()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} local, {} remote: {} downloaded, {} created, {} updated, {} unchanged, {} images",
            self.local_posts,
            self.remote_posts,
            self.downloaded.len(),
            self.created.len(),
            self.updated.len(),
            self.unchanged,
            self.images_resolved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_noop() {
        assert!(SyncReport::default().is_noop());
        let report = SyncReport {
            created: vec!["hello".into()],
            ..Default::default()
        };
        assert!(!report.is_noop());
    }

    #[test]
    fn display_summarizes_counts() {
        let report = SyncReport {
            local_posts: 3,
            remote_posts: 2,
            downloaded: vec!["a".into()],
            created: vec!["b".into()],
            updated: vec![],
            unchanged: 2,
            images_resolved: 4,
        };
        assert_eq!(
            report.to_string(),
            "3 local, 2 remote: 1 downloaded, 1 created, 0 updated, 2 unchanged, 4 images"
        );
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(SyncReport::default()).unwrap();
        assert_eq!(json["local_posts"], 0);
        assert!(json["created"].as_array().unwrap().is_empty());
    }
}
