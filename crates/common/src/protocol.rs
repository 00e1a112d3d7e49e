//! Types exchanged between the transform engine and its callers.
//!
//! [`EncryptionInfo`] is serialised as JSON into the root of every sealed
//! document; the remaining types are reported back to the CLI.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Transform mode and results
// ---------------------------------------------------------------------------

/// Direction of a transform run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Replace plaintext target values with tokens.
    Encrypt,
    /// Replace tokens with the plaintext they carry.
    Decrypt,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Encrypt => f.write_str("encrypt"),
            Mode::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Counters reported after a transform run.
///
/// Used for user-facing confirmation only; correctness never depends on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformStats {
    /// Number of target locations selected in the document.
    pub visited: usize,
    /// Number of values rewritten by this run.
    pub changed: usize,
    /// Number of values already in the requested state.
    pub skipped: usize,
}

/// A non-fatal observation about the document's shape.
///
/// The selector never fails on an unexpected shape; it records one of these
/// and moves on, so an export without login items seals to itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaWarning {
    /// The root is not an object or has no `items` array.
    MissingItems,
    /// `items[item]` is not an object.
    ItemNotObject { item: usize },
    /// `items[item].login` is present but not an object.
    LoginNotObject { item: usize },
    /// `items[item].fields` is present but not an array.
    FieldsNotArray { item: usize },
    /// `items[item].fields[field]` is not an object.
    FieldNotObject { item: usize, field: usize },
}

impl std::fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaWarning::MissingItems => f.write_str("document has no top-level `items` array"),
            SchemaWarning::ItemNotObject { item } => write!(f, "items[{item}] is not an object"),
            SchemaWarning::LoginNotObject { item } => {
                write!(f, "items[{item}].login is not an object")
            }
            SchemaWarning::FieldsNotArray { item } => {
                write!(f, "items[{item}].fields is not an array")
            }
            SchemaWarning::FieldNotObject { item, field } => {
                write!(f, "items[{item}].fields[{field}] is not an object")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sealed-document metadata
// ---------------------------------------------------------------------------

/// Name of the root-level key holding [`EncryptionInfo`].
pub const ENCRYPTION_INFO_KEY: &str = "encryption";

/// Name of the root-level informational flag.
pub const ENCRYPTED_FLAG_KEY: &str = "encrypted";

/// Descriptive block written into the root of a sealed document.
///
/// Informational for humans, except `key_fingerprint` (used to reject a
/// mismatched key before any token is touched) and `flag_inserted` (used to
/// restore the root flag exactly on decrypt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionInfo {
    /// AEAD scheme used for every token.
    pub scheme: String,
    /// Literal prefix carried by every token.
    pub marker: String,
    /// Human-readable description of the encrypted locations.
    pub scope: Vec<String>,
    /// Key check value of the sealing key (not key material).
    pub key_fingerprint: String,
    /// `true` when the root `encrypted` flag did not exist before sealing.
    #[serde(default)]
    pub flag_inserted: bool,
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Overall state of the target locations in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    /// No target locations were selected.
    Empty,
    /// Every target location holds plaintext.
    Plaintext,
    /// Every target location holds a token.
    Sealed,
    /// Some locations are tokens and some are not (interrupted or hand-edited).
    Mixed,
}

impl std::fmt::Display for DocumentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocumentState::Empty => "empty",
            DocumentState::Plaintext => "plaintext",
            DocumentState::Sealed => "sealed",
            DocumentState::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mode_serialises_lowercase() {
        assert_eq!(serde_json::to_value(Mode::Encrypt).unwrap(), json!("encrypt"));
        assert_eq!(Mode::Decrypt.to_string(), "decrypt");
    }

    #[test]
    fn encryption_info_uses_camel_case() {
        let info = EncryptionInfo {
            scheme: "aes-256-gcm-siv".into(),
            marker: "sealed:v1:".into(),
            scope: vec!["a".into()],
            key_fingerprint: "00ff".into(),
            flag_inserted: true,
        };
        let v = serde_json::to_value(&info).unwrap();
        assert_eq!(v["keyFingerprint"], "00ff");
        assert_eq!(v["flagInserted"], true);
    }

    #[test]
    fn encryption_info_flag_inserted_defaults_false() {
        let v = json!({
            "scheme": "aes-256-gcm-siv",
            "marker": "sealed:v1:",
            "scope": [],
            "keyFingerprint": "abcd"
        });
        let info: EncryptionInfo = serde_json::from_value(v).unwrap();
        assert!(!info.flag_inserted);
    }

    #[test]
    fn schema_warning_display() {
        let w = SchemaWarning::FieldNotObject { item: 2, field: 0 };
        assert_eq!(w.to_string(), "items[2].fields[0] is not an object");
    }
}
