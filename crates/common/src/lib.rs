//! Common types, document metadata, and errors shared across `export-seal` crates.

pub mod error;
pub mod protocol;

pub use error::SealError;
pub use protocol::{DocumentState, EncryptionInfo, Mode, SchemaWarning, TransformStats};
