//! [`SealKey`]: in-memory holder for the symmetric sealing key.

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::digest::Key;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::crypto::KEY_LEN;

/// Label authenticated under the key to derive its fingerprint.
const FINGERPRINT_LABEL: &[u8] = b"export-seal/key-fingerprint/v1";

/// Number of HMAC output bytes kept in a fingerprint.
const FINGERPRINT_LEN: usize = 8;

/// Length of a key artifact: padded base64 of [`KEY_LEN`] bytes plus a newline.
const ARTIFACT_LEN: usize = (KEY_LEN + 2) / 3 * 4 + 1;

/// Errors produced by the key layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The artifact contains no key line.
    #[error("key artifact is empty")]
    Empty,

    /// The key line is not valid base64.
    #[error("key is not valid base64")]
    Encoding,

    /// The decoded key material has an unexpected length.
    #[error("key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
#[derive(Clone)]
pub struct SealKey(Box<[u8; KEY_LEN]>);

impl SealKey {
    /// Generate a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut buf = Box::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut buf[..]);
        Self(buf)
    }

    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if the slice is not [`KEY_LEN`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// Short hex key check value: HMAC-SHA256 of a fixed label under this key.
    ///
    /// Safe to log and to store next to ciphertext; it reveals nothing about
    /// the key beyond allowing two keys to be compared.
    pub fn fingerprint(&self) -> String {
        // Zero-padded to the SHA-256 block size, which HMAC does itself.
        let mut padded = Key::<Hmac<Sha256>>::default();
        padded[..KEY_LEN].copy_from_slice(self.as_bytes());
        let mut mac = <Hmac<Sha256> as Mac>::new(&padded);
        wipe(&mut padded);
        mac.update(FINGERPRINT_LABEL);
        let digest = mac.finalize().into_bytes();
        digest[..FINGERPRINT_LEN]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    /// Encode the key as standard padded base64.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.as_bytes())
    }

    /// The exact bytes of a key artifact: the encoded key and a newline.
    ///
    /// Allocated at its final size. Callers [`wipe`] the buffer once it is
    /// written.
    pub fn to_artifact(&self) -> Vec<u8> {
        let mut text = String::with_capacity(ARTIFACT_LEN);
        STANDARD.encode_string(self.as_bytes(), &mut text);
        text.push('\n');
        text.into_bytes()
    }

    /// Decode a key from the text of a key artifact.
    ///
    /// Blank lines and lines starting with `#` are ignored; the first
    /// remaining line is the key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Empty`], [`KeyError::Encoding`], or
    /// [`KeyError::InvalidLength`] depending on what is wrong with the text.
    pub fn decode(text: &str) -> Result<Self, KeyError> {
        let line = text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))
            .ok_or(KeyError::Empty)?;
        let mut bytes = STANDARD.decode(line).map_err(|_| KeyError::Encoding)?;
        let key = Self::from_bytes(&bytes);
        wipe(&mut bytes);
        key
    }

    /// Decode a key from raw artifact bytes, then zero them.
    ///
    /// # Errors
    ///
    /// As [`SealKey::decode`], plus [`KeyError::Encoding`] if the bytes are
    /// not UTF-8.
    pub fn decode_artifact(mut raw: Vec<u8>) -> Result<Self, KeyError> {
        let key = match std::str::from_utf8(&raw) {
            Ok(text) => Self::decode(text),
            Err(_) => Err(KeyError::Encoding),
        };
        wipe(&mut raw);
        key
    }
}

/// Overwrite a buffer that held key material with zeroes.
pub fn wipe(buf: &mut [u8]) {
    buf.iter_mut().for_each(|b| *b = 0);
}

impl Drop for SealKey {
    fn drop(&mut self) {
        wipe(&mut self.0[..]);
    }
}

impl std::fmt::Debug for SealKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("SealKey([REDACTED])")
    }
}
