//! Observability infrastructure: subscriber setup and the file sink.
//!
//! The executor echoes entries through `tracing` on the
//! `cdnguard::operations` target and reports sink failures on
//! `cdnguard::log_fallback`. [`init_tracing`] installs the subscriber that
//! renders both.

pub mod file_sink;

pub use file_sink::{read_log_file, FileLogSink};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::errors::{InfraError, InfraResult};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter` when it is set and
/// valid. Output is human-readable unless `config.json` is set.
///
/// # Errors
/// Returns [`InfraError::Tracing`] if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> InfraResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| InfraError::Tracing(format!("invalid filter {:?}: {e}", config.filter)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = if config.json { builder.json().try_init() } else { builder.try_init() };

    result.map_err(|e| InfraError::Tracing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_without_panicking() {
        let config = LoggingConfig { filter: "warn".to_string(), ..LoggingConfig::default() };

        assert!(init_tracing(&config).is_ok());
        let err = init_tracing(&config).expect_err("global subscriber already set");
        assert!(matches!(err, InfraError::Tracing(_)));
    }
}
