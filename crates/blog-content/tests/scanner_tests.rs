//! Scanning posts against a real blog root on disk

use std::fs;
use std::path::Path;

use blog_content::{Error, scan};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::{TempDir, tempdir};

fn root_with_image(rel: &str) -> TempDir {
    let dir = tempdir().unwrap();
    let path = dir.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"fake image bytes").unwrap();
    dir
}

#[test]
fn finds_title_and_relative_image() {
    let root = root_with_image("img/cat.png");
    let post = "# Hello\n\n![alt](img/cat.png)";

    let scanned = scan(post, root.path()).unwrap();

    assert_eq!(scanned.title, "Hello");
    assert_eq!(scanned.images.len(), 1);
    let image = &scanned.images[0];
    assert_eq!(image.reference, "img/cat.png");
    assert_eq!(image.rel_path, "img/cat.png");
    assert_eq!(image.full_path, root.path().join("img/cat.png"));
    assert_eq!(image.size, 16);
}

#[test]
fn skips_absolute_urls() {
    let root = root_with_image("img/cat.png");
    let scanned = scan("# Hello\n\n![alt](http://example.com/cat.png)", root.path()).unwrap();
    assert!(scanned.images.is_empty());
}

#[test]
fn skips_non_image_destinations() {
    let root = root_with_image("files/report.pdf");
    let scanned = scan("![report](files/report.pdf)", root.path()).unwrap();
    assert!(scanned.images.is_empty());
}

#[test]
fn skips_absolute_local_paths() {
    let root = root_with_image("img/cat.png");
    let absolute = root.path().join("img/cat.png");
    let post = format!("![abs]({})", absolute.display());

    let scanned = scan(&post, root.path()).unwrap();

    assert!(scanned.images.is_empty());
}

#[test]
fn omits_missing_images() {
    let root = root_with_image("img/cat.png");
    let scanned = scan("![a](img/cat.png)\n![b](img/missing.png)", root.path()).unwrap();

    let refs: Vec<_> = scanned.images.iter().map(|i| i.reference.as_str()).collect();
    assert_eq!(refs, vec!["img/cat.png"]);
}

#[test]
fn cleans_redundant_segments_but_keeps_reference() {
    let root = root_with_image("img/cat.png");
    let scanned = scan("![a](./img//cat.png)", root.path()).unwrap();

    assert_eq!(scanned.images.len(), 1);
    assert_eq!(scanned.images[0].reference, "./img//cat.png");
    assert_eq!(scanned.images[0].rel_path, "img/cat.png");
}

#[test]
fn escaping_the_root_fails_the_scan() {
    let outer = tempdir().unwrap();
    let root = outer.path().join("blog");
    fs::create_dir_all(&root).unwrap();
    fs::write(outer.path().join("secret.png"), b"x").unwrap();

    let result = scan("![s](../secret.png)", &root);

    match result {
        Err(Error::Fs(err)) => assert!(err.is_path_rejection()),
        other => panic!("expected a path rejection, got {other:?}"),
    }
}

#[test]
fn keeps_document_order() {
    let root = root_with_image("a.png");
    fs::write(root.path().join("b.gif"), b"gif").unwrap();

    let scanned = scan("![b](b.gif) text ![a](a.png)", root.path()).unwrap();

    let refs: Vec<_> = scanned.images.iter().map(|i| i.rel_path.as_str()).collect();
    assert_eq!(refs, vec!["b.gif", "a.png"]);
}

#[test]
fn images_inside_links_and_lists_are_found() {
    let root = root_with_image("img/cat.png");
    let post = "- item with [![thumb](img/cat.png)](https://example.com)\n";

    let scanned = scan(post, root.path()).unwrap();

    assert_eq!(scanned.images.len(), 1);
    assert!(Path::new(&scanned.images[0].full_path).exists());
}

#[rstest]
#[case::atx("# Hello\n\nBody\n", "# Hello\n")]
#[case::closed_atx("# Hello #\n\nBody\n", "# Hello #\n")]
#[case::setext("Hello\n=====\n\nBody\n", "Hello\n=====\n")]
#[case::crlf("# Hello\r\n\r\nBody\r\n", "# Hello\r\n")]
#[case::last_line("# Hello", "# Hello")]
#[case::indented("Intro\n\n  # Hello\nBody\n", "  # Hello\n")]
fn title_span_covers_the_whole_heading(#[case] post: &str, #[case] heading: &str) {
    let scanned = scan(post, Path::new("/nonexistent")).unwrap();

    assert_eq!(scanned.title, "Hello");
    let span = scanned.title_span.expect("title span");
    assert_eq!(&post[span], heading);
}

#[test]
fn untitled_post_has_no_title_span() {
    let scanned = scan("Just text.\n", Path::new("/nonexistent")).unwrap();
    assert_eq!(scanned.title_span, None);
}

#[rstest]
#[case::plain("![a](img/cat.png)", "img/cat.png", "img/cat.png")]
#[case::with_title("![a](img/cat.png \"A cat\")", "img/cat.png", "img/cat.png")]
#[case::angle_brackets("![a](<img/my cat.png>)", "img/my cat.png", "<img/my cat.png>")]
#[case::escaped("![a](img/cat\\_1.png)", "img/cat_1.png", "img/cat\\_1.png")]
#[case::nested_alt("![a [b] c](img/cat.png)", "img/cat.png", "img/cat.png")]
#[case::reference("![a][pic]\n\n[pic]: img/cat.png\n", "img/cat.png", "img/cat.png")]
#[case::shortcut("![pic]\n\n[pic]: <img/my cat.png>\n", "img/my cat.png", "<img/my cat.png>")]
fn image_span_covers_the_destination_as_written(
    #[case] post: &str,
    #[case] rel: &str,
    #[case] written: &str,
) {
    let root = root_with_image(rel);

    let scanned = scan(post, root.path()).unwrap();

    assert_eq!(scanned.images.len(), 1);
    let image = &scanned.images[0];
    assert_eq!(image.rel_path, rel);
    let span = image.span.clone().expect("destination span");
    assert_eq!(&post[span], written);
}
