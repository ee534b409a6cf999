//! Sanitization of externally supplied path strings
//!
//! Every string that ends up as a local filesystem path but did not originate
//! from our own directory walk goes through [`sanitize_relative`]: Markdown
//! image destinations, names reported by an image host, decoded image
//! identities and remote post slugs.

use std::path::Path;

use crate::{Error, Result};

/// Extensions treated as images, compared case-insensitively.
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "svg"];

/// Check that `candidate` is a relative path that stays inside its root.
///
/// Returns:
/// - `Ok(Some(path))` with the unchanged input when it is safe to join onto a root
/// - `Ok(None)` when the input is absolute and `allow_absolute` is set; the
///   caller should skip it
/// - `Err(Error::InvalidPath)` for an empty input
/// - `Err(Error::UnsafePath)` when any component is `.` or `..`, or when the
///   input is absolute and `allow_absolute` is not set
///
/// Dot components are rejected before the absolute check, so a path such as
/// `/a/../b` is unsafe even when absolute paths are tolerated. Some harmless
/// inputs (`./a.png`) are rejected as well; callers are expected to
/// [`clean`] paths they produced themselves.
pub fn sanitize_relative(candidate: &str, allow_absolute: bool) -> Result<Option<String>> {
    if candidate.is_empty() {
        return Err(Error::InvalidPath {
            reason: "empty path".into(),
        });
    }

    if candidate
        .split(['/', '\\'])
        .any(|component| component == "." || component == "..")
    {
        return Err(Error::unsafe_path(
            candidate,
            "path contains a '.' or '..' component",
        ));
    }

    if is_absolute(candidate) {
        if allow_absolute {
            return Ok(None);
        }
        return Err(Error::unsafe_path(candidate, "absolute paths are not allowed"));
    }

    Ok(Some(candidate.to_string()))
}

/// Like [`sanitize_relative`] without the absolute-path escape hatch.
///
/// Used for strings that are about to become a write target.
pub fn sanitize_strict(candidate: &str) -> Result<String> {
    sanitize_relative(candidate, false)?
        .ok_or_else(|| Error::unsafe_path(candidate, "absolute paths are not allowed"))
}

fn is_absolute(candidate: &str) -> bool {
    candidate.starts_with('/') || candidate.starts_with('\\') || Path::new(candidate).is_absolute()
}

/// Lexically clean a slash-separated path.
///
/// Collapses repeated separators, drops `.` components and resolves `..`
/// against preceding components. Leading `..` components of a relative path
/// are kept (and later rejected by [`sanitize_relative`]); on a rooted path
/// they are dropped. An empty result becomes `"."`.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Whether a link destination or file name points at an image we sync.
pub fn is_image_file(name: &str) -> bool {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file_name.rfind('.') {
        Some(idx) => {
            let ext = file_name[idx + 1..].to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}
