//! Two blog roots ("machines") sharing one remote blog and image host.
//!
//! Posts written on one machine must arrive on the other with identical
//! content and image layout, and edits must flow back the other way.

use std::time::Duration;

use blog_core::{SyncEngine, SyncOptions, SyncReport};
use blog_fs::RetryPolicy;
use blog_images::{ImageStore, ObjectStoreImages, WebDavImages};
use blog_test_utils::blog::TestBlog;
use blog_test_utils::services::{FakeBlog, FakeDav, FakePhotos};
use blog_test_utils::utc;
use chrono::Utc;
use pretty_assertions::assert_eq;

const POST: &str = "2024-03-01-hello.md";
const CONTENT: &str = "# Hello\n\nA cat:\n\n![cat](2024-03-01-hello/cat.png)\n";

fn retry() -> RetryPolicy {
    RetryPolicy::linear(2, Duration::ZERO)
}

/// Shared remote side, backed by either image host.
#[derive(Clone)]
enum Remote {
    SnapAs(FakeBlog, FakePhotos),
    WebDav(FakeBlog, FakeDav),
}

impl Remote {
    fn blog(&self) -> &FakeBlog {
        match self {
            Remote::SnapAs(blog, _) | Remote::WebDav(blog, _) => blog,
        }
    }

    fn sync(&self, machine: &TestBlog, options: SyncOptions) -> SyncReport {
        let images: Box<dyn ImageStore> = match self {
            Remote::SnapAs(_, photos) => {
                Box::new(ObjectStoreImages::new(photos.clone(), machine.root(), retry()))
            }
            Remote::WebDav(_, dav) => Box::new(WebDavImages::new(
                dav.clone(),
                machine.root(),
                "https://img.example.com/blog",
                retry(),
            )),
        };
        SyncEngine::new(machine.root(), "me", self.blog().clone(), images, retry())
            .run(options)
            .unwrap()
    }
}

fn remotes() -> Vec<Remote> {
    vec![
        Remote::SnapAs(FakeBlog::new(), FakePhotos::default()),
        Remote::WebDav(FakeBlog::new(), FakeDav::new()),
    ]
}

/// Make a local edit look older than `secs` seconds from now.
fn backdate(machine: &TestBlog, rel: &str, secs: i64) {
    machine.set_modified(rel, Utc::now() - chrono::Duration::seconds(secs));
}

#[test]
fn post_and_images_travel_between_machines() {
    for remote in remotes() {
        let laptop = TestBlog::new();
        laptop.write_post(POST, CONTENT);
        laptop.write_image("2024-03-01-hello/cat.png", b"meow");

        let report = remote.sync(&laptop, SyncOptions::both());
        assert_eq!(report.created, vec!["hello".to_string()]);

        let desktop = TestBlog::new();
        let report = remote.sync(&desktop, SyncOptions::both());

        assert_eq!(report.downloaded, vec!["hello".to_string()]);
        assert_eq!(desktop.post_files(), vec![POST.to_string()]);
        assert_eq!(desktop.read(POST), CONTENT);
        assert_eq!(desktop.read_bytes("2024-03-01-hello/cat.png"), b"meow");
    }
}

#[test]
fn remote_edit_flows_back_and_settles() {
    for remote in remotes() {
        let laptop = TestBlog::new();
        laptop.write_post(POST, CONTENT);
        laptop.write_image("2024-03-01-hello/cat.png", b"meow");
        backdate(&laptop, POST, 600);
        remote.sync(&laptop, SyncOptions::both());

        let desktop = TestBlog::new();
        remote.sync(&desktop, SyncOptions::download_only());
        let edited = CONTENT.replace("A cat:", "A sleepy cat:");
        desktop.write_post(POST, &edited);
        desktop.set_modified(POST, Utc::now() + chrono::Duration::seconds(60));

        let report = remote.sync(&desktop, SyncOptions::both());
        assert_eq!(report.updated, vec!["hello".to_string()]);

        let report = remote.sync(&laptop, SyncOptions::both());
        assert_eq!(report.downloaded, vec!["hello".to_string()]);
        assert_eq!(laptop.read(POST), edited);

        let report = remote.sync(&laptop, SyncOptions::both());
        assert!(report.is_noop(), "{report}");
    }
}

#[test]
fn repeated_runs_are_idempotent() {
    for remote in remotes() {
        let laptop = TestBlog::new();
        laptop.write_post(POST, CONTENT);
        laptop.write_post("2024-03-02-second.md", "# Second\n\nNo pictures.\n");
        laptop.write_image("2024-03-01-hello/cat.png", b"meow");

        remote.sync(&laptop, SyncOptions::both());
        let writes = remote.blog().writes();

        for _ in 0..2 {
            let report = remote.sync(&laptop, SyncOptions::both());
            assert!(report.is_noop(), "{report}");
            assert_eq!(report.unchanged, 2);
        }
        assert_eq!(remote.blog().writes(), writes);
    }
}

#[test]
fn new_posts_are_created_at_noon_of_their_date() {
    let remote = Remote::SnapAs(FakeBlog::new(), FakePhotos::default());
    let laptop = TestBlog::new();
    laptop.write_post("2023-12-31-last.md", "# Last\n");

    remote.sync(&laptop, SyncOptions::upload_only());

    let post = remote.blog().post("last").unwrap();
    assert_eq!(post.created, utc("2023-12-31T12:00:00Z"));
    assert_eq!(post.title, "Last");
    assert_eq!(post.body, "");
}
