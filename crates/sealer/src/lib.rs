//! Selective encryption of password-manager JSON exports.
//!
//! Login passwords (`items[].login.password` on `type == 1` items) and hidden
//! custom-field values (`items[].fields[].value` on `type == 1` fields) are
//! replaced with authenticated `sealed:v1:` tokens. Everything else in the
//! document is left as it was.
//!
//! ```no_run
//! use common::Mode;
//! use sealer::{key, storage, transform};
//! # fn main() -> Result<(), common::SealError> {
//! let document = storage::read_document("export.json".as_ref(), 64 << 20)?;
//! let seal_key = key::generate();
//! key::save(&seal_key, "export_key.txt".as_ref(), false)?;
//! let sealed = transform::transform(&document, Mode::Encrypt, &seal_key)?;
//! storage::write_document("export_sealed.json".as_ref(), &sealed.document, false)?;
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod key;
pub mod schema;
pub mod storage;
pub mod transform;

pub use key::SealKey;
pub use transform::{inspect, transform, Inspection, Transformed};
