//! Common error types shared across crates.

use thiserror::Error;

/// Top-level error type for a seal or unseal run.
///
/// Every variant is fatal for the run: the transform is all-or-nothing and no
/// partially transformed document is ever written. Variants map to process
/// exit codes returned by the CLI:
/// - [`SealError::Usage`] → 2
/// - [`SealError::Io`] → 3
/// - [`SealError::KeyFormat`] → 4
/// - [`SealError::Format`] → 5
/// - [`SealError::Authentication`] → 6
/// - [`SealError::Document`] → 7
#[derive(Debug, Error)]
pub enum SealError {
    /// The command line was inconsistent (e.g. `--decrypt` without `--keyfile`).
    #[error("usage: {0}")]
    Usage(String),

    /// A document or key artifact could not be read or written.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// Path of the artifact that failed.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The key artifact is malformed or has the wrong length.
    #[error("invalid key artifact: {0}")]
    KeyFormat(String),

    /// A value carries the token marker but does not parse as a token.
    #[error("malformed token at {0}")]
    Format(String),

    /// A token failed integrity verification (wrong key or tampered data).
    #[error("authentication failed at {0}: wrong key or corrupted data")]
    Authentication(String),

    /// The input is not a usable JSON document.
    #[error("invalid document: {0}")]
    Document(String),
}

impl SealError {
    /// Build an [`SealError::Io`] for the given path.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        SealError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Returns the process exit code that should be used for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SealError::Usage(_) => 2,
            SealError::Io { .. } => 3,
            SealError::KeyFormat(_) => 4,
            SealError::Format(_) => 5,
            SealError::Authentication(_) => 6,
            SealError::Document(_) => 7,
        }
    }
}
