//! Validation layer.
//!
//! Pure and deterministic: turns raw inbound payloads into validated values before any
//! store access happens. A [`ValidationError`] names the offending field and the
//! constraint it broke.

mod error;
mod payloads;
mod rules;

pub use error::{Constraint, ValidationError};
pub use payloads::Validate;
pub use rules::{at_least, length, min_length, one_of, optional, required, Choice};
