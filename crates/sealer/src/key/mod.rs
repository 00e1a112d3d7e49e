//! Key generation, export, and import.
//!
//! # Lifecycle
//!
//! 1. On the first `encrypt` run, [`SealKey::generate`] draws a fresh key and
//!    [`save`] writes it to a key artifact before any field is processed.
//! 2. Every later run (`encrypt` reusing the artifact, or `decrypt`) reads it
//!    back with [`load`].
//!
//! # Security invariants
//!
//! - Key bytes are **never** logged or embedded in a document. Only
//!   [`SealKey::fingerprint`] appears in logs and metadata.
//! - The artifact is written atomically with owner-only permissions.

pub mod material;

pub use material::{wipe, KeyError, SealKey};

use std::path::Path;

use common::SealError;
use tracing::info;

use crate::storage;

impl From<KeyError> for SealError {
    fn from(e: KeyError) -> Self {
        SealError::KeyFormat(e.to_string())
    }
}

/// Generate a new key from the OS CSPRNG.
pub fn generate() -> SealKey {
    SealKey::generate()
}

/// Write `key` to the artifact at `path`.
///
/// The file holds exactly the encoded key followed by a newline.
///
/// # Errors
///
/// Returns [`SealError::Io`] if the destination is not writable, or if it
/// already exists and `overwrite` is `false`.
pub fn save(key: &SealKey, path: &Path, overwrite: bool) -> Result<(), SealError> {
    let mut text = key.to_artifact();
    let written = storage::write_atomic(path, &text, overwrite);
    wipe(&mut text);
    written?;

    info!(path = %path.display(), key_fingerprint = %key.fingerprint(), "key artifact written");
    Ok(())
}

/// Read a key back from the artifact at `path`.
///
/// # Errors
///
/// Returns [`SealError::Io`] if the file cannot be read, and
/// [`SealError::KeyFormat`] if it is malformed or the key has the wrong length.
pub fn load(path: &Path) -> Result<SealKey, SealError> {
    let raw = std::fs::read(path).map_err(|e| SealError::io(path, e))?;
    let key = SealKey::decode_artifact(raw)?;

    info!(path = %path.display(), key_fingerprint = %key.fingerprint(), "key artifact loaded");
    Ok(key)
}
