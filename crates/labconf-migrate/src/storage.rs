//! Document files
//!
//! A failed read is reported with its IO error so callers can log why the
//! document is absent.
//! Writes go to a temporary file in the target's directory and are renamed
//! over the target, so a document is never left half-written.

use crate::error::StorageError;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Read a document file
///
/// # Errors
/// Returns the IO error if the file is missing or cannot be read
pub fn read_document(path: &Path) -> io::Result<Vec<u8>> {
    std::fs::read(path).map_err(|err| {
        tracing::warn!(path = %path.display(), error = %err, "document file not readable");
        err
    })
}

/// Atomically replace `path` with `bytes`
///
/// # Errors
/// Returns error if the temporary file cannot be created, written or renamed
pub fn write_document(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io_error(path, e))?;
    tmp.write_all(bytes).map_err(|e| StorageError::io_error(path, e))?;
    tmp.as_file().sync_all().map_err(|e| StorageError::io_error(path, e))?;
    tmp.persist(path).map_err(|e| StorageError::io_error(path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "document written");
    Ok(())
}
