//! Configuration loading and management
//!
//! [`Config`] groups executor tuning with logging destinations. It is read
//! from a TOML or JSON file, then adjusted by `CDNGUARD_*` environment
//! variables.
//!
//! ```toml
//! [executor]
//! max_retries = 3
//! base_delay_ms = 1000
//! max_delay_ms = 30000
//! console_level = "info"
//!
//! [logging]
//! log_path = "logs/operations.jsonl"
//! filter = "info,cdnguard=debug"
//! json = false
//! ```

pub mod loader;

use std::path::PathBuf;

use cdnguard_common::resilience::ExecutorConfig;
use serde::{Deserialize, Serialize};

// Re-export commonly used items
pub use loader::{
    apply_env_overrides, load, load_from_file, probe_config_paths, ENV_BASE_DELAY_MS,
    ENV_LOG_FILTER, ENV_LOG_JSON, ENV_LOG_LEVEL, ENV_LOG_PATH, ENV_MAX_DELAY_MS, ENV_MAX_RETRIES,
};

use crate::errors::InfraResult;

/// Top-level configuration. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub executor: ExecutorConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// # Errors
    /// Returns [`InfraError::InvalidConfig`](crate::InfraError::InvalidConfig)
    /// when the executor settings are inconsistent.
    pub fn validate(&self) -> InfraResult<()> {
        self.executor.validate()?;
        Ok(())
    }
}

/// Where log entries and diagnostics go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// JSON-lines file receiving every log entry. No file when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    /// `EnvFilter` directives for the console subscriber; `RUST_LOG` wins.
    pub filter: String,
    /// Emit console output as JSON instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_path: None, filter: "info".to_string(), json: false }
    }
}
