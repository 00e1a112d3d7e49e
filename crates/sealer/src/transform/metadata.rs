//! Root-level `encrypted` flag and `encryption` block handling.

use common::protocol::{ENCRYPTED_FLAG_KEY, ENCRYPTION_INFO_KEY};
use common::{EncryptionInfo, Mode, SealError};
use serde_json::Value;
use tracing::warn;

use crate::crypto::cipher::{MARKER, SCHEME};
use crate::key::SealKey;

/// Human-readable description of the sealed locations.
const SCOPE: [&str; 2] = [
    "items[].login.password where items[].type == 1",
    "items[].fields[].value where items[].fields[].type == 1",
];

/// Return the `encryption` block written by this engine, if the document has one.
///
/// A block with a different scheme (or an unrelated object under the same
/// key) is treated as foreign; see [`check`].
pub fn read_info(document: &Value) -> Option<EncryptionInfo> {
    let raw = document.get(ENCRYPTION_INFO_KEY)?;
    serde_json::from_value::<EncryptionInfo>(raw.clone())
        .ok()
        .filter(|info| info.scheme == SCHEME)
}

/// Check the root metadata before any location is touched.
///
/// # Errors
///
/// - [`SealError::Authentication`] if the document was sealed under a
///   different key.
/// - [`SealError::Document`] on encrypt when the root `encryption` field is
///   already taken by a value this engine did not write.
pub fn check(document: &Value, mode: Mode, key: &SealKey) -> Result<(), SealError> {
    match read_info(document) {
        Some(info) if info.key_fingerprint != key.fingerprint() => Err(SealError::Authentication(
            format!("{ENCRYPTION_INFO_KEY}.keyFingerprint"),
        )),
        Some(_) => Ok(()),
        None if mode == Mode::Encrypt && document.get(ENCRYPTION_INFO_KEY).is_some() => {
            Err(SealError::Document(format!(
                "root `{ENCRYPTION_INFO_KEY}` field is already in use by another tool"
            )))
        }
        None => Ok(()),
    }
}

/// Set `encrypted = true` and write (or refresh) the `encryption` block.
///
/// Callers run [`check`] first; an occupied `encryption` field is replaced.
pub fn mark_sealed(document: &mut Value, key: &SealKey) {
    let existing = read_info(document);
    let Some(root) = document.as_object_mut() else {
        return;
    };

    let flag_inserted = match &existing {
        Some(info) => info.flag_inserted,
        None => !root.contains_key(ENCRYPTED_FLAG_KEY),
    };
    root.insert(ENCRYPTED_FLAG_KEY.into(), Value::Bool(true));

    let info = EncryptionInfo {
        scheme: SCHEME.into(),
        marker: MARKER.into(),
        scope: SCOPE.iter().map(|s| (*s).to_owned()).collect(),
        key_fingerprint: key.fingerprint(),
        flag_inserted,
    };
    match serde_json::to_value(info) {
        Ok(v) => {
            root.insert(ENCRYPTION_INFO_KEY.into(), v);
        }
        Err(e) => warn!(error = %e, "failed to serialise encryption block"),
    }
}

/// Restore the root flag and drop this engine's `encryption` block.
///
/// Without a block, an existing `encrypted` flag is set to `false`; the flag
/// is never inserted on decrypt.
pub fn mark_unsealed(document: &mut Value) {
    let existing = read_info(document);
    let Some(root) = document.as_object_mut() else {
        return;
    };

    match existing {
        Some(info) => {
            root.shift_remove(ENCRYPTION_INFO_KEY);
            if info.flag_inserted {
                root.shift_remove(ENCRYPTED_FLAG_KEY);
            } else {
                root.insert(ENCRYPTED_FLAG_KEY.into(), Value::Bool(false));
            }
        }
        None => {
            if let Some(flag) = root.get_mut(ENCRYPTED_FLAG_KEY) {
                *flag = Value::Bool(false);
            }
        }
    }
}
