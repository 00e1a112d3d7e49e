//! Target field selection for password-manager export documents.
//!
//! # Responsibilities
//!
//! - Walk a parsed export and return the ordered set of [`Location`]s that
//!   must be sealed: `items[].login.password` where `items[].type == 1`, and
//!   `items[].fields[].value` where `items[].fields[].type == 1`.
//! - Report shape problems as non-fatal [`common::SchemaWarning`]s.
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** This module must not import anything from
//!   `crate::crypto` or `crate::key`.
//! - **Read-only.** Selection never mutates the document.

pub mod location;
pub mod selector;

pub use location::{Location, Slot};
pub use selector::{select, Selection};
