//! Scoped file access for documents and key artifacts.
//!
//! Every write goes to a temporary file in the destination directory and is
//! renamed into place only after it has been fully written and synced, so a
//! failed run never leaves a truncated document or key behind. Temporary
//! files are created owner-only (`0600` on Unix) and keep that mode.

use std::io::{Read, Write};
use std::path::Path;

use common::SealError;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

/// Read and parse the JSON document at `path`.
///
/// # Errors
///
/// Returns [`SealError::Io`] if the file cannot be read, and
/// [`SealError::Document`] if it exceeds `max_bytes` or is not valid JSON.
pub fn read_document(path: &Path, max_bytes: u64) -> Result<Value, SealError> {
    let file = std::fs::File::open(path).map_err(|e| SealError::io(path, e))?;

    let mut buf = Vec::new();
    file.take(max_bytes.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|e| SealError::io(path, e))?;
    if buf.len() as u64 > max_bytes {
        return Err(SealError::Document(format!(
            "{} is larger than the {max_bytes}-byte input limit",
            path.display()
        )));
    }

    let document = serde_json::from_slice(&buf)
        .map_err(|e| SealError::Document(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), bytes = buf.len(), "document read");
    Ok(document)
}

/// Serialise `document` as pretty JSON and write it atomically to `path`.
///
/// Output uses two-space indentation, keeps non-ASCII characters verbatim,
/// and ends with a newline.
///
/// # Errors
///
/// Returns [`SealError::Io`] if the destination cannot be written, or if it
/// already exists and `overwrite` is `false`.
pub fn write_document(path: &Path, document: &Value, overwrite: bool) -> Result<(), SealError> {
    let mut bytes = serde_json::to_vec_pretty(document)
        .map_err(|e| SealError::Document(format!("failed to serialise document: {e}")))?;
    bytes.push(b'\n');
    write_atomic(path, &bytes, overwrite)?;
    debug!(path = %path.display(), bytes = bytes.len(), "document written");
    Ok(())
}

/// Write `bytes` to `path` via a synced temporary file and an atomic rename.
///
/// # Errors
///
/// Returns [`SealError::Io`] on any filesystem failure. With `overwrite` set
/// to `false`, an existing destination is reported as
/// [`std::io::ErrorKind::AlreadyExists`].
pub fn write_atomic(path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), SealError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SealError::io(path, e))?;
    tmp.write_all(bytes).map_err(|e| SealError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| SealError::io(path, e))?;

    let persisted = if overwrite {
        tmp.persist(path)
    } else {
        tmp.persist_noclobber(path)
    };
    persisted.map_err(|e| SealError::io(path, e.error))?;
    Ok(())
}
