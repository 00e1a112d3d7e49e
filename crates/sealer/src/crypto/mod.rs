//! AES-256-GCM-SIV field encryption primitives and the token format.
//!
//! This module is intentionally free of document and filesystem concerns.
//! It provides the low-level encode/decode operations used by the transform
//! engine, plus the key-free [`is_token`] predicate.
//!
//! # Token format
//!
//! ```text
//! sealed:v1:<base64url-no-pad(nonce || ciphertext+tag)>
//! ```
//!
//! The `v1` inside the marker enables future algorithm or format migration
//! without breaking existing tokens.

pub mod cipher;

pub use cipher::{classify, decode, encode, is_token, CipherError, TokenShape, KEY_LEN, MARKER};
