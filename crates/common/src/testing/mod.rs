//! Test doubles for code built on the executor.
//!
//! - [`mocks::ScriptedOperation`]: a fake remote call that replays scripted
//!   results and records when it was invoked
//! - [`mocks::FailingLogSink`]: a sink whose every append fails
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use cdnguard_common::error::NormalizedError;
//! use cdnguard_common::testing::ScriptedOperation;
//!
//! let op = ScriptedOperation::new([Err(NormalizedError::with_status(503)), Ok("done")]);
//! assert_eq!(op.calls(), 0);
//! # }
//! ```

pub mod mocks;

pub use mocks::{FailingLogSink, ScriptedOperation};
