//! Seal / unseal orchestration: selector + codec + key.

use common::{Mode, SchemaWarning, SealError, TransformStats};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::metadata;
use crate::crypto::{self, CipherError, TokenShape};
use crate::key::SealKey;
use crate::schema::{self, Location};

/// Output of a successful [`transform`] run.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// The new document. The input is never modified.
    pub document: Value,
    /// Counters for user-facing confirmation.
    pub stats: TransformStats,
    /// Shape problems found while selecting locations.
    pub warnings: Vec<SchemaWarning>,
}

/// Seal or unseal every target location of `document` under `key`.
///
/// Works on a deep copy. The run is all-or-nothing: on the first failing
/// location the copy is dropped and only the error is returned.
///
/// - [`Mode::Encrypt`]: plaintext values become tokens; tokens are skipped.
/// - [`Mode::Decrypt`]: tokens become plaintext; plaintext is skipped.
///
/// # Errors
///
/// - [`SealError::Authentication`] if a token fails verification, or the
///   document records a different key fingerprint.
/// - [`SealError::Document`] on encrypt if the root `encryption` field holds
///   something this engine did not write.
/// - [`SealError::Format`] if a value carries the marker but does not parse.
/// - [`SealError::KeyFormat`] if the key is unusable by the cipher.
#[instrument(skip_all, fields(mode = %mode))]
pub fn transform(document: &Value, mode: Mode, key: &SealKey) -> Result<Transformed, SealError> {
    let mut out = document.clone();

    let selection = schema::select(&out);
    for warning in &selection.warnings {
        warn!(warning = %warning, "unexpected document shape; skipping");
    }

    metadata::check(&out, mode, key)?;

    let mut stats = TransformStats {
        visited: selection.locations.len(),
        ..TransformStats::default()
    };

    for location in &selection.locations {
        let Some(slot) = location.slot_mut(&mut out) else {
            continue;
        };

        match (mode, crypto::classify(slot.as_str())) {
            (_, TokenShape::Malformed) => {
                return Err(SealError::Format(location.to_string()));
            }
            (Mode::Encrypt, TokenShape::Token) | (Mode::Decrypt, TokenShape::Plain) => {
                debug!(location = %location, "already in target state");
                stats.skipped += 1;
            }
            (Mode::Encrypt, TokenShape::Plain) => {
                let token = crypto::encode(slot.as_str(), key.as_bytes())
                    .map_err(|e| cipher_failure(e, location))?;
                *slot = token;
                stats.changed += 1;
            }
            (Mode::Decrypt, TokenShape::Token) => {
                let plaintext = crypto::decode(slot.as_str(), key.as_bytes())
                    .map_err(|e| cipher_failure(e, location))?;
                *slot = plaintext;
                stats.changed += 1;
            }
        }
    }

    match mode {
        Mode::Encrypt if stats.changed > 0 => metadata::mark_sealed(&mut out, key),
        Mode::Encrypt => {}
        Mode::Decrypt => metadata::mark_unsealed(&mut out),
    }

    info!(
        visited = stats.visited,
        changed = stats.changed,
        skipped = stats.skipped,
        key_fingerprint = %key.fingerprint(),
        "transform complete"
    );

    Ok(Transformed {
        document: out,
        stats,
        warnings: selection.warnings,
    })
}

fn cipher_failure(e: CipherError, location: &Location) -> SealError {
    match e {
        CipherError::Authentication => SealError::Authentication(location.to_string()),
        CipherError::InvalidFormat => SealError::Format(location.to_string()),
        CipherError::InvalidKeyLength | CipherError::AeadFailure => {
            SealError::KeyFormat(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{is_token, KEY_LEN, MARKER};
    use serde_json::json;

    fn example() -> Value {
        json!({
            "items": [{
                "type": 1,
                "login": {"password": "hunter2"},
                "fields": [
                    {"type": 1, "value": "secretPIN"},
                    {"type": 0, "value": "notHidden"}
                ]
            }]
        })
    }

    #[test]
    fn example_round_trip() {
        let key = SealKey::generate();
        let original = example();

        let sealed = transform(&original, Mode::Encrypt, &key).unwrap();
        let doc = &sealed.document;
        let pw = doc["items"][0]["login"]["password"].as_str().unwrap();
        let pin = doc["items"][0]["fields"][0]["value"].as_str().unwrap();
        assert!(pw.starts_with(MARKER) && pw != "hunter2");
        assert!(pin.starts_with(MARKER) && pin != "secretPIN");
        assert_eq!(doc["items"][0]["fields"][1]["value"], "notHidden");
        assert_eq!(doc["encrypted"], true);
        assert_eq!(
            sealed.stats,
            TransformStats { visited: 2, changed: 2, skipped: 0 }
        );

        let opened = transform(doc, Mode::Decrypt, &key).unwrap();
        assert_eq!(opened.document, original);
        assert_eq!(opened.stats.changed, 2);
    }

    #[test]
    fn input_is_not_mutated() {
        let key = SealKey::generate();
        let original = example();
        let copy = original.clone();
        transform(&original, Mode::Encrypt, &key).unwrap();
        assert_eq!(original, copy);
    }

    #[test]
    fn encrypt_is_idempotent() {
        let key = SealKey::generate();
        let once = transform(&example(), Mode::Encrypt, &key).unwrap().document;
        let twice = transform(&once, Mode::Encrypt, &key).unwrap();
        assert_eq!(twice.document, once);
        assert_eq!(
            twice.stats,
            TransformStats { visited: 2, changed: 0, skipped: 2 }
        );
    }

    #[test]
    fn mixed_document_seals_only_plaintext() {
        let key = SealKey::generate();
        let token = crypto::encode("already", key.as_bytes()).unwrap();
        let doc = json!({
            "items": [{"type": 1, "login": {"password": token.clone()}, "fields": [{"type": 1, "value": "fresh"}]}]
        });
        let sealed = transform(&doc, Mode::Encrypt, &key).unwrap();
        assert_eq!(sealed.document["items"][0]["login"]["password"], token.as_str());
        assert!(is_token(sealed.document["items"][0]["fields"][0]["value"].as_str().unwrap()));
        assert_eq!(sealed.stats.changed, 1);
        assert_eq!(sealed.stats.skipped, 1);
    }

    #[test]
    fn decrypting_plaintext_is_noop() {
        let key = SealKey::generate();
        let doc = json!({"encrypted": false, "items": [{"type": 1, "login": {"password": "plain"}}]});
        let opened = transform(&doc, Mode::Decrypt, &key).unwrap();
        assert_eq!(opened.document, doc);
        assert_eq!(opened.stats.skipped, 1);
    }

    #[test]
    fn empty_password_untouched() {
        let key = SealKey::generate();
        let doc = json!({"items": [{"type": 1, "login": {"password": ""}}]});
        let sealed = transform(&doc, Mode::Encrypt, &key).unwrap();
        assert_eq!(sealed.document, doc);
        assert_eq!(sealed.stats, TransformStats::default());
    }

    #[test]
    fn wrong_key_is_authentication_error() {
        let k1 = SealKey::from_bytes(&[1u8; KEY_LEN]).unwrap();
        let k2 = SealKey::from_bytes(&[2u8; KEY_LEN]).unwrap();
        let sealed = transform(&example(), Mode::Encrypt, &k1).unwrap().document;

        let err = transform(&sealed, Mode::Decrypt, &k2).unwrap_err();
        assert!(matches!(err, SealError::Authentication(_)));

        // Without the metadata block, every token still fails verification.
        let mut bare = sealed.clone();
        bare.as_object_mut().unwrap().shift_remove("encryption");
        let err = transform(&bare, Mode::Decrypt, &k2).unwrap_err();
        assert!(matches!(err, SealError::Authentication(ref at) if at == "items[0].login.password"));
    }

    #[test]
    fn encrypting_with_a_different_key_is_refused() {
        let k1 = SealKey::from_bytes(&[1u8; KEY_LEN]).unwrap();
        let k2 = SealKey::from_bytes(&[2u8; KEY_LEN]).unwrap();
        let sealed = transform(&example(), Mode::Encrypt, &k1).unwrap().document;
        let err = transform(&sealed, Mode::Encrypt, &k2).unwrap_err();
        assert!(matches!(err, SealError::Authentication(_)));
    }

    #[test]
    fn resealing_a_partly_reset_document_under_a_new_key_is_refused() {
        let k1 = SealKey::from_bytes(&[1u8; KEY_LEN]).unwrap();
        let k2 = SealKey::from_bytes(&[2u8; KEY_LEN]).unwrap();
        let mut sealed = transform(&example(), Mode::Encrypt, &k1).unwrap().document;
        sealed["items"][0]["login"]["password"] = json!("reset");
        let err = transform(&sealed, Mode::Encrypt, &k2).unwrap_err();
        assert!(matches!(err, SealError::Authentication(_)));
    }

    #[test]
    fn occupied_encryption_field_refuses_encrypt() {
        let key = SealKey::generate();
        let doc = json!({
            "encryption": {"vendor": "x"},
            "items": [{"type": 1, "login": {"password": "pw"}}]
        });
        let err = transform(&doc, Mode::Encrypt, &key).unwrap_err();
        assert!(matches!(err, SealError::Document(_)));

        let opened = transform(&doc, Mode::Decrypt, &key).unwrap();
        assert_eq!(opened.document, doc);
    }

    #[test]
    fn malformed_token_is_format_error() {
        let key = SealKey::generate();
        let doc = json!({"items": [{"type": 1, "login": {"password": "sealed:v1:@@@"}}]});
        for mode in [Mode::Encrypt, Mode::Decrypt] {
            let err = transform(&doc, mode, &key).unwrap_err();
            assert!(matches!(err, SealError::Format(ref at) if at == "items[0].login.password"));
        }
    }

    #[test]
    fn missing_items_completes_with_warning() {
        let key = SealKey::generate();
        let doc = json!({"folders": [], "encrypted": false});
        let sealed = transform(&doc, Mode::Encrypt, &key).unwrap();
        assert_eq!(sealed.document, doc);
        assert_eq!(sealed.stats, TransformStats::default());
        assert_eq!(sealed.warnings, [SchemaWarning::MissingItems]);
    }
}
