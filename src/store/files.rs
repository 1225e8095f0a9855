//! Filesystem helpers shared by the store.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::error::StoreError;

/// True if `name` is a single path component naming a file
///
/// Rejects separators, `.`/`..` and absolute paths, so joining the name
/// onto a directory never leaves that directory.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Replace `path` with `bytes` without ever exposing a partial file
///
/// The bytes go to a temp file in the same directory, which is then
/// renamed over the target.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(|e| StoreError::io_at("create directory", dir, e))?;

    let mut tmp =
        NamedTempFile::new_in(dir).map_err(|e| StoreError::io_at("create temp file in", dir, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StoreError::io_at("write temp file for", path, e))?;
    tmp.persist(path)
        .map_err(|e| StoreError::io_at("replace", path, e.error))?;

    Ok(())
}

/// Write `bytes` to `path`, truncating any previous content
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    fs::write(path, bytes).map_err(|e| StoreError::io_at("write", path, e))
}

/// Read a file, mapping a missing file to `None`
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io_at("read", path, e)),
    }
}

/// Delete a file; a missing file is fine and other failures are logged
pub fn remove_file_best_effort(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "File already gone");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete file"),
    }
}

/// Delete a directory tree; a missing directory is fine and other failures are logged
pub fn remove_dir_best_effort(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Directory already gone");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete directory"),
    }
}
