//! Shared building blocks for cdnguard site tooling.
//!
//! The centrepiece is [`resilience::ResilientExecutor`], which runs a remote
//! management call (CloudFront, S3, ...) with categorized retry, backoff with
//! jitter, structured logging, and remediation-annotated failures.
//!
//! # Feature Tiers
//!
//! - `foundation`: error normalization, categorization, remediation
//! - `runtime` (default): executor, log entries and sinks
//! - `test-utils`: scripted operations and failing sinks for tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod observability;
#[cfg(feature = "runtime")]
pub mod resilience;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "runtime")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{categorize, Backoff, ErrorCategory, ErrorShape, NormalizedError, RetryStrategy};
#[cfg(feature = "runtime")]
pub use observability::{
    EntryKind, EntryMetadata, LogEntry, LogLevel, LogSink, MemoryLogSink, NoOpLogSink, SinkError,
};
#[cfg(feature = "runtime")]
pub use resilience::{
    ConfigError, EnrichedError, ExecutionContext, ExecutorConfig, ExecutorConfigBuilder,
    ResilientExecutor,
};
#[cfg(feature = "foundation")]
pub use utils::serde::duration_millis;
