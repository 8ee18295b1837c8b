//! Infrastructure error type.

use std::io;
use std::path::PathBuf;

use cdnguard_common::resilience::ConfigError;
use thiserror::Error;

pub type InfraResult<T> = Result<T, InfraError>;

/// Failures at the infrastructure edge: files, environment, subscriber setup.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("config file not found: {0:?}")]
    ConfigNotFound(PathBuf),

    #[error("failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid {format} in {path:?}: {message}")]
    ConfigParse { path: PathBuf, format: &'static str, message: String },

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid value for {key}: {message}")]
    InvalidEnv { key: String, message: String },

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("failed to open log file {path:?}: {source}")]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read log file {path:?}: {source}")]
    LogRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed entry on line {line} of {path:?}: {source}")]
    LogParse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to initialize tracing: {0}")]
    Tracing(String),
}

impl InfraError {
    pub(crate) fn invalid_env(key: &str, message: impl ToString) -> Self {
        Self::InvalidEnv { key: key.to_string(), message: message.to_string() }
    }
}
