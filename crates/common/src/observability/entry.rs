//! Log entry records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{ErrorCategory, NormalizedError};
use crate::resilience::ExecutionContext;

/// Severity of a log entry, ordered `debug < info < warn < error < fatal`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Lowercase name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized log level string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}' (expected debug, info, warn, error or fatal)")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// What a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// An attempt is about to run.
    AttemptStarted,
    /// An attempt returned an error.
    AttemptFailed,
    /// The call failed for good; an enriched error was returned.
    OperationFailed,
}

impl EntryKind {
    /// Snake-case name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AttemptStarted => "attempt_started",
            Self::AttemptFailed => "attempt_failed",
            Self::OperationFailed => "operation_failed",
        }
    }

    /// Level the executor records this kind at.
    pub const fn level(self) -> LogLevel {
        match self {
            Self::AttemptStarted => LogLevel::Info,
            Self::AttemptFailed => LogLevel::Warn,
            Self::OperationFailed => LogLevel::Error,
        }
    }
}

/// Call-level details carried by every entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Human-readable operation name given to `execute`.
    pub operation: String,
    /// Identifier shared by all entries of one `execute` call.
    pub call_id: Uuid,
    /// 1-based attempt number (total attempts for `operation_failed`).
    pub attempt: u32,
    /// Attempt budget, `max_retries + 1`.
    pub max_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
    /// Backoff before the next attempt, when one will follow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remediation: Vec<String>,
    /// Caller-supplied context, verbatim.
    #[serde(default)]
    pub context: ExecutionContext,
}

/// One immutable structured log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub metadata: EntryMetadata,
}

impl LogEntry {
    /// New entry stamped with the current time, at the kind's default level.
    pub fn new(kind: EntryKind, metadata: EntryMetadata) -> Self {
        Self {
            timestamp: Utc::now(),
            level: kind.level(),
            kind,
            message: None,
            error_name: None,
            error_message: None,
            metadata,
        }
    }

    #[must_use]
    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Copy name and message from a failed attempt's error.
    #[must_use]
    pub fn with_error(mut self, error: &NormalizedError) -> Self {
        self.error_name.clone_from(&error.name);
        self.error_message.clone_from(&error.message);
        self
    }

    /// One-line description for console output.
    pub fn summary(&self) -> String {
        match (&self.message, &self.error_name, &self.error_message) {
            (Some(message), _, _) => message.clone(),
            (None, Some(name), Some(detail)) => format!("{name}: {detail}"),
            (None, Some(name), None) => name.clone(),
            (None, None, Some(detail)) => detail.clone(),
            (None, None, None) => self.kind.as_str().to_string(),
        }
    }
}
