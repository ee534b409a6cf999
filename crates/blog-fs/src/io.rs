//! Atomic I/O operations and file timestamps

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use fs2::FileExt;

use crate::{Error, Result};

/// Size and timestamps of a local file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub size: u64,
    pub modified: DateTime<Utc>,
    /// Birth time; equals `modified` on filesystems that do not record it.
    pub created: DateTime<Utc>,
}

/// Stat a file, following symlinks.
pub fn stamp(path: &Path) -> Result<FileStamp> {
    let meta = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    let modified = meta.modified().map_err(|e| Error::io(path, e))?;
    let created = meta.created().unwrap_or(modified);

    Ok(FileStamp {
        size: meta.len(),
        modified: DateTime::<Utc>::from(modified),
        created: DateTime::<Utc>::from(created),
    })
}

/// Stat a regular file, returning `None` when nothing (or a directory) is there.
pub fn stamp_if_file(path: &Path) -> Result<Option<FileStamp>> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => stamp(path).map(Some),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Write content atomically to a file with locking.
///
/// Writes to a temporary sibling, then renames it over the target so a
/// killed run never leaves a half-written post or image behind.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let written = write_locked(&temp_path, path, content)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_locked(temp_path: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })
}

/// Read a whole file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Read a whole file as bytes.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Set the modification time of an existing file.
pub fn set_modified(path: &Path, modified: DateTime<Utc>) -> Result<()> {
    let file = File::options()
        .write(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    file.set_modified(SystemTime::from(modified))
        .map_err(|e| Error::io(path, e))
}
