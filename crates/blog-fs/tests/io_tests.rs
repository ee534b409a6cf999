//! Tests for the atomic write helpers

use blog_fs::io;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn write_atomic_creates_missing_parents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("2024-03-01-hello").join("img").join("cat.png");

    io::write_atomic(&path, b"\x89PNG").unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG".to_vec());
}

#[test]
fn write_atomic_replaces_existing_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("2024-03-01-hello.md");
    std::fs::write(&path, "a much longer original body that should disappear").unwrap();

    io::write_atomic(&path, b"short").unwrap();

    assert_eq!(io::read_text(&path).unwrap(), "short");
}

#[test]
fn write_atomic_leaves_no_temp_files() {
    let dir = tempdir().unwrap();
    io::write_atomic(&dir.path().join("post.md"), b"content").unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "found temp files: {leftovers:?}");
}

#[test]
fn failed_write_atomic_removes_its_temp_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("2024-03-01-hello");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("cat.png"), b"x").unwrap();

    assert!(io::write_atomic(&target, b"content").is_err());

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["2024-03-01-hello".to_string()]);
}

#[test]
fn read_text_reports_the_missing_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.md");

    let err = io::read_text(&missing).unwrap_err();

    assert!(err.to_string().contains("nope.md"));
}
