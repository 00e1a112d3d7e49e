//! Document transformation: seal, unseal, and inspect.
//!
//! [`transform`] is the single entry point used by callers. It clones the
//! input, runs the selector, rewrites each target through the token codec,
//! and updates the root `encrypted` flag and `encryption` block.
//!
//! # Invariants
//!
//! - `decrypt(encrypt(d)) == d` for every document `d`.
//! - `encrypt(encrypt(d)) == encrypt(d)`: tokens are never double-wrapped.
//! - Non-target values are never touched in either direction.

pub mod engine;
pub mod inspect;
pub mod metadata;

pub use engine::{transform, Transformed};
pub use inspect::{inspect, Inspection};
