//! AES-256-GCM-SIV encryption and decryption of individual string fields.
//!
//! **Nonces:** every call to [`encrypt_field`] draws a fresh 96-bit nonce from
//! the OS CSPRNG, so encoding the same plaintext twice yields two different
//! tokens. AES-GCM-SIV degrades gracefully if a nonce ever repeats, but the
//! codec never reuses one deliberately.

use aes_gcm_siv::{
    aead::{Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Literal prefix that appears at the start of every token.
///
/// A plaintext starting with this literal must also carry a well-formed
/// payload to be mistaken for a token; see [`classify`].
pub const MARKER: &str = "sealed:v1:";

/// Name of the AEAD scheme, as recorded in sealed-document metadata.
pub const SCHEME: &str = "aes-256-gcm-siv";

/// A parsed token payload.
///
/// The string representation is `sealed:v1:<base64url(nonce || ciphertext+tag)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedField {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

impl EncryptedField {
    /// Encode this value to its canonical token representation.
    pub fn to_token(&self) -> String {
        let mut payload = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        payload.extend_from_slice(&self.nonce);
        payload.extend_from_slice(&self.ciphertext);
        format!("{MARKER}{}", URL_SAFE_NO_PAD.encode(payload))
    }

    /// Parse a token string back into an [`EncryptedField`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidFormat`] if the string lacks the marker,
    /// the payload is not base64url, or it is too short to hold a nonce and tag.
    pub fn parse(s: &str) -> Result<Self, CipherError> {
        let encoded = s.strip_prefix(MARKER).ok_or(CipherError::InvalidFormat)?;
        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| CipherError::InvalidFormat)?;
        if payload.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::InvalidFormat);
        }
        let (nonce_bytes, ciphertext) = payload.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// The authentication tag did not verify (wrong key or tampered data).
    #[error("authentication failed")]
    Authentication,

    /// AES-GCM-SIV encryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The token string (or the plaintext it carries) is malformed.
    #[error("invalid token format")]
    InvalidFormat,
}

/// Syntactic shape of a string value, determined without the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    /// No marker: ordinary plaintext.
    Plain,
    /// Marker plus a structurally valid payload.
    Token,
    /// Marker present but the payload does not parse.
    Malformed,
}

/// Classify `value` as plaintext, token, or corrupted token.
pub fn classify(value: &str) -> TokenShape {
    if !value.starts_with(MARKER) {
        return TokenShape::Plain;
    }
    match EncryptedField::parse(value) {
        Ok(_) => TokenShape::Token,
        Err(_) => TokenShape::Malformed,
    }
}

/// Returns `true` if `value` is a structurally valid token.
///
/// This is a cheap check: it does not verify the authentication tag.
pub fn is_token(value: &str) -> bool {
    classify(value) == TokenShape::Token
}

/// Encrypt a plaintext string and return its token.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
pub fn encode(plaintext: &str, key: &[u8]) -> Result<String, CipherError> {
    Ok(encrypt_field(plaintext.as_bytes(), key)?.to_token())
}

/// Decrypt a token back to its plaintext string.
///
/// # Errors
///
/// Returns [`CipherError::InvalidFormat`] if the token does not parse or the
/// plaintext is not UTF-8, and [`CipherError::Authentication`] if the tag does
/// not verify.
pub fn decode(token: &str, key: &[u8]) -> Result<String, CipherError> {
    let field = EncryptedField::parse(token)?;
    let plaintext = decrypt_field(&field, key)?;
    String::from_utf8(plaintext).map_err(|_| CipherError::InvalidFormat)
}

/// Encrypt plaintext bytes using AES-256-GCM-SIV under a fresh random nonce.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (should be
/// unreachable with a valid key and nonce).
pub fn encrypt_field(plaintext: &[u8], key: &[u8]) -> Result<EncryptedField, CipherError> {
    let cipher = build_cipher(key)?;

    use aes_gcm_siv::aead::rand_core::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CipherError::AeadFailure)?;

    Ok(EncryptedField {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt an [`EncryptedField`] back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::Authentication`] if the tag does not verify.
pub fn decrypt_field(field: &EncryptedField, key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    let nonce = Nonce::from_slice(&field.nonce);
    cipher
        .decrypt(nonce, field.ciphertext.as_ref())
        .map_err(|_| CipherError::Authentication)
}

fn build_cipher(key: &[u8]) -> Result<Aes256GcmSiv, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength);
    }
    Aes256GcmSiv::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)
}
