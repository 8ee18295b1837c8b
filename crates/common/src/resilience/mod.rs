//! Resilient execution of remote management calls.
//!
//! [`ResilientExecutor::execute`] wraps an async operation with:
//! - categorized retry: only [`ErrorCategory`](crate::error::ErrorCategory)
//!   values whose [`RetryStrategy`](crate::error::RetryStrategy) is retryable
//!   are attempted again, at most `max_retries` times
//! - exponential or linear backoff with up to 10% random jitter
//! - one structured [`LogEntry`](crate::observability::LogEntry) per attempt
//!   start, per attempt failure, and per terminal failure
//! - an [`EnrichedError`] on terminal failure carrying the category, the
//!   caller's [`ExecutionContext`], attempt count, and remediation steps
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use cdnguard_common::error::NormalizedError;
//! use cdnguard_common::observability::MemoryLogSink;
//! use cdnguard_common::resilience::{ExecutionContext, ExecutorConfig, ResilientExecutor};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let sink = Arc::new(MemoryLogSink::new());
//! let executor = ResilientExecutor::new(ExecutorConfig::default(), sink.clone());
//!
//! let context = ExecutionContext::new().with("distribution_id", "E2QWRUHAPOMQZL");
//! let result = executor
//!     .execute("get distribution", context, || async {
//!         Err::<(), _>(NormalizedError::named("AccessDenied"))
//!     })
//!     .await;
//!
//! let error = result.unwrap_err();
//! assert_eq!(error.attempts(), 1);
//! assert!(!error.remediation().is_empty());
//! # }
//! ```

pub mod context;
pub mod executor;
pub mod retry;

pub use context::ExecutionContext;
pub use executor::{EnrichedError, ResilientExecutor, UNNAMED_OPERATION};
pub use retry::{apply_jitter, backoff_delay, ConfigError, ExecutorConfig, ExecutorConfigBuilder};
