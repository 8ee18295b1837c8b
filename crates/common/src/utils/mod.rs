//! Small shared helpers.
//!
//! - **[`serde`]**: serde adapters for `Duration` fields in config files

pub mod serde;

pub use self::serde::duration_millis;
