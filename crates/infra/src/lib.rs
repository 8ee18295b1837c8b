//! # cdnguard Infrastructure
//!
//! Impure edges around the resilient executor in `cdnguard-common`.
//!
//! This crate contains:
//! - Configuration loading (TOML/JSON files plus `CDNGUARD_*` overrides)
//! - The append-only JSON-lines [`FileLogSink`]
//! - `tracing` subscriber setup
//! - CloudFront operation helpers that name and annotate executor calls
//!
//! ## Wiring
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), cdnguard_infra::InfraError> {
//! use std::sync::Arc;
//!
//! use cdnguard_common::error::NormalizedError;
//! use cdnguard_infra::{build_executor, config, init_tracing, CloudFrontOperations};
//!
//! let config = config::load()?;
//! init_tracing(&config.logging)?;
//! let cloudfront = CloudFrontOperations::new(Arc::new(build_executor(&config)?));
//!
//! let status = cloudfront
//!     .distribution_operation("E2QWRUHAPOMQZL", "status check", || async {
//!         Ok::<_, NormalizedError>("Deployed")
//!     })
//!     .await;
//! # let _ = status;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod errors;
pub mod observability;
pub mod operations;

use std::sync::Arc;

use cdnguard_common::observability::{LogSink, NoOpLogSink};
use cdnguard_common::resilience::ResilientExecutor;

pub use config::{Config, LoggingConfig};
pub use errors::{InfraError, InfraResult};
pub use observability::{init_tracing, read_log_file, FileLogSink};
pub use operations::CloudFrontOperations;

/// Build an executor from loaded configuration.
///
/// Entries go to a [`FileLogSink`] when `logging.log_path` is set and are
/// discarded otherwise (the console echo still applies).
///
/// # Errors
/// Returns [`InfraError::InvalidConfig`] for inconsistent executor settings
/// and [`InfraError::SinkOpen`] when the log file cannot be opened.
pub fn build_executor(config: &Config) -> InfraResult<ResilientExecutor> {
    config.validate()?;

    let sink: Arc<dyn LogSink> = match &config.logging.log_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Logging operations to file");
            Arc::new(FileLogSink::open(path)?)
        }
        None => Arc::new(NoOpLogSink),
    };

    Ok(ResilientExecutor::new(config.executor.clone(), sink))
}
