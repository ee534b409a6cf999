//! Behavior of the WebDAV backend against an in-memory share.

use std::time::Duration;

use blog_content::LocalImage;
use blog_fs::RetryPolicy;
use blog_images::{DavEntry, Error, ImageStore, WebDavImages};
use blog_test_utils::blog::TestBlog;
use blog_test_utils::services::FakeDav;
use blog_test_utils::utc;
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;

const PUBLISHED: &str = "https://img.example.com/blog";

fn local_image(blog: &TestBlog, rel: &str, bytes: &[u8], modified: DateTime<Utc>) -> LocalImage {
    let full_path = blog.write_image(rel, bytes);
    blog.set_modified(rel, modified);
    LocalImage {
        reference: rel.to_string(),
        span: None,
        rel_path: rel.to_string(),
        full_path,
        size: bytes.len() as u64,
        modified,
    }
}

fn store(blog: &TestBlog, dav: &FakeDav) -> WebDavImages<FakeDav> {
    let mut store = WebDavImages::new(
        dav.clone(),
        blog.root(),
        &format!("{PUBLISHED}/"),
        RetryPolicy::linear(3, Duration::ZERO),
    );
    store.build_index().unwrap();
    store
}

#[test]
fn index_walks_directories_and_records_published_urls() {
    let blog = TestBlog::new();
    let dav = FakeDav::new()
        .with_file("cover.png", b"c", None)
        .with_file("img/cat.png", b"meow", Some(utc("2024-03-01T10:00:00Z")))
        .with_file("img/2024/dog.png", b"woof", None);

    let store = store(&blog, &dav);

    assert_eq!(store.len(), 3);
    let cat = store.get("img/cat.png").unwrap();
    assert_eq!(cat.url, format!("{PUBLISHED}/img/cat.png"));
    assert_eq!(cat.size, 4);
    assert_eq!(cat.modified, Some(utc("2024-03-01T10:00:00Z")));
    assert!(store.get("img/2024/dog.png").is_some());
}

#[test]
fn unsafe_remote_name_aborts_the_index() {
    let blog = TestBlog::new();
    let dav = FakeDav::new().with_listing(
        "",
        vec![DavEntry {
            name: "..".into(),
            is_dir: true,
            size: 0,
            modified: None,
        }],
    );
    let mut store = WebDavImages::new(dav, blog.root(), PUBLISHED, RetryPolicy::none());

    let err = store.build_index().unwrap_err();

    assert!(matches!(err, Error::Fs(ref e) if e.is_path_rejection()), "{err}");
}

#[test]
fn same_size_and_not_older_skips_upload() {
    let blog = TestBlog::new();
    let dav = FakeDav::new().with_file("img/cat.png", b"MEOW", Some(utc("2024-03-02T00:00:00Z")));
    let mut store = store(&blog, &dav);
    let image = local_image(&blog, "img/cat.png", b"meow", utc("2024-03-01T00:00:00Z"));

    let url = store.ensure_uploaded(&image).unwrap();

    assert_eq!(url, format!("{PUBLISHED}/img/cat.png"));
    assert!(dav.writes().is_empty());
}

#[test]
fn remote_without_timestamp_counts_as_not_older() {
    let blog = TestBlog::new();
    let dav = FakeDav::new().with_file("img/cat.png", b"meow", None);
    let mut store = store(&blog, &dav);
    let image = local_image(&blog, "img/cat.png", b"meow", utc("2024-03-01T00:00:00Z"));

    store.ensure_uploaded(&image).unwrap();

    assert!(dav.writes().is_empty());
}

#[test]
fn older_remote_copy_is_replaced() {
    let blog = TestBlog::new();
    let dav = FakeDav::new().with_file("img/cat.png", b"MEOW", Some(utc("2024-01-01T00:00:00Z")));
    let mut store = store(&blog, &dav);
    let image = local_image(&blog, "img/cat.png", b"meow", utc("2024-03-01T00:00:00Z"));

    store.ensure_uploaded(&image).unwrap();

    assert_eq!(dav.writes(), vec!["img/cat.png".to_string()]);
    assert_eq!(dav.file("img/cat.png").unwrap(), b"meow");
}

#[test]
fn new_image_is_uploaded_once() {
    let blog = TestBlog::new();
    let dav = FakeDav::new();
    let mut store = store(&blog, &dav);
    let image = local_image(&blog, "2024-03-01-hello/cat.png", b"meow", utc("2024-03-01T00:00:00Z"));

    let first = store.ensure_uploaded(&image).unwrap();
    let second = store.ensure_uploaded(&image).unwrap();

    assert_eq!(first, format!("{PUBLISHED}/2024-03-01-hello/cat.png"));
    assert_eq!(first, second);
    assert_eq!(dav.writes().len(), 1);
}

#[test]
fn foreign_urls_are_not_ours() {
    let blog = TestBlog::new();
    let dav = FakeDav::new();
    let mut store = store(&blog, &dav);

    for url in [
        "https://i.snap.as/cat.png",
        "https://img.example.com/blogger/cat.png",
    ] {
        assert_eq!(store.ensure_downloaded(url, "2024-03-01", "hello").unwrap(), None);
    }
    assert!(dav.reads().is_empty());
}

#[test]
fn missing_local_image_is_downloaded_with_remote_mtime() {
    let blog = TestBlog::new();
    let remote_time = utc("2024-03-01T10:00:00Z");
    let dav = FakeDav::new().with_file("img/cat.png", b"meow", Some(remote_time));
    let mut store = store(&blog, &dav);

    let rel = store
        .ensure_downloaded(&format!("{PUBLISHED}/img/cat.png"), "2024-03-01", "hello")
        .unwrap();

    assert_eq!(rel.as_deref(), Some("img/cat.png"));
    assert_eq!(blog.read_bytes("img/cat.png"), b"meow");
    assert_eq!(blog.modified("img/cat.png"), remote_time);
}

#[test]
fn unindexed_image_is_stat_before_download() {
    let blog = TestBlog::new();
    let dav = FakeDav::new();
    let mut store = store(&blog, &dav);
    let dav = dav.with_file("late.png", b"late", Some(utc("2024-03-01T10:00:00Z")));

    let rel = store
        .ensure_downloaded(&format!("{PUBLISHED}/late.png"), "2024-03-01", "hello")
        .unwrap();

    assert_eq!(rel.as_deref(), Some("late.png"));
    assert_eq!(dav.stats(), vec!["late.png".to_string()]);
    blog.assert_file_exists("late.png");
}

#[test]
fn same_size_local_copy_is_kept() {
    let blog = TestBlog::new();
    blog.write_image("img/cat.png", b"MEOW");
    let dav = FakeDav::new().with_file("img/cat.png", b"meow", Some(Utc::now()));
    let mut store = store(&blog, &dav);

    store
        .ensure_downloaded(&format!("{PUBLISHED}/img/cat.png"), "2024-03-01", "hello")
        .unwrap();

    assert!(dav.reads().is_empty());
    assert_eq!(blog.read_bytes("img/cat.png"), b"MEOW");
}

#[test]
fn newer_local_copy_is_kept() {
    let blog = TestBlog::new();
    local_image(&blog, "img/cat.png", b"local!", utc("2024-03-05T00:00:00Z"));
    let dav = FakeDav::new().with_file("img/cat.png", b"meow", Some(utc("2024-03-01T00:00:00Z")));
    let mut store = store(&blog, &dav);

    store
        .ensure_downloaded(&format!("{PUBLISHED}/img/cat.png"), "2024-03-01", "hello")
        .unwrap();

    assert!(dav.reads().is_empty());
}

#[test]
fn older_local_copy_is_replaced() {
    let blog = TestBlog::new();
    local_image(&blog, "img/cat.png", b"local!", utc("2024-01-01T00:00:00Z"));
    let dav = FakeDav::new().with_file("img/cat.png", b"meow", Some(utc("2024-03-01T00:00:00Z")));
    let mut store = store(&blog, &dav);

    store
        .ensure_downloaded(&format!("{PUBLISHED}/img/cat.png"), "2024-03-01", "hello")
        .unwrap();

    assert_eq!(dav.reads(), vec!["img/cat.png".to_string()]);
    assert_eq!(blog.read_bytes("img/cat.png"), b"meow");
}

#[test]
fn remote_without_timestamp_never_replaces_a_local_copy() {
    let blog = TestBlog::new();
    local_image(&blog, "img/cat.png", b"local!", utc("2024-01-01T00:00:00Z"));
    let dav = FakeDav::new().with_file("img/cat.png", b"meow", None);
    let mut store = store(&blog, &dav);

    store
        .ensure_downloaded(&format!("{PUBLISHED}/img/cat.png"), "2024-03-01", "hello")
        .unwrap();

    assert!(dav.reads().is_empty());
}

#[test]
fn escaping_url_path_is_rejected() {
    let blog = TestBlog::new();
    let dav = FakeDav::new();
    let mut store = store(&blog, &dav);

    let err = store
        .ensure_downloaded(&format!("{PUBLISHED}/../secret.png"), "2024-03-01", "hello")
        .unwrap_err();

    assert!(matches!(err, Error::Fs(ref e) if e.is_path_rejection()), "{err}");
}
