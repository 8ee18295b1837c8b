//! Structured operation logging.
//!
//! Every [`ResilientExecutor`](crate::resilience::ResilientExecutor) call
//! produces immutable [`LogEntry`] records that are appended to a
//! [`LogSink`]. Entries at or above the executor's console level are also
//! echoed as `tracing` events so operators see them in whatever subscriber
//! the host installed.
//!
//! - [`entry`]: the record types and [`LogLevel`]
//! - [`sink`]: the append-only sink trait plus in-memory and no-op sinks

pub mod entry;
pub mod sink;

pub use entry::{EntryKind, EntryMetadata, LogEntry, LogLevel, ParseLevelError};
pub use sink::{LogSink, MemoryLogSink, NoOpLogSink, SinkError};

/// `tracing` target used for console echo of log entries.
pub const CONSOLE_TARGET: &str = "cdnguard::operations";

/// `tracing` target used when a sink write fails.
pub const FALLBACK_TARGET: &str = "cdnguard::log_fallback";

/// Emit `entry` as a `tracing` event at the matching level.
pub fn echo(entry: &LogEntry) {
    macro_rules! emit {
        ($macro:ident) => {
            tracing::$macro!(
                target: CONSOLE_TARGET,
                kind = entry.kind.as_str(),
                operation = %entry.metadata.operation,
                call_id = %entry.metadata.call_id,
                attempt = entry.metadata.attempt,
                max_attempts = entry.metadata.max_attempts,
                category = entry.metadata.category.map(|c| c.as_str()),
                delay_ms = entry.metadata.delay_ms,
                "{}",
                entry.summary()
            )
        };
    }

    match entry.level {
        LogLevel::Debug => emit!(debug),
        LogLevel::Info => emit!(info),
        LogLevel::Warn => emit!(warn),
        LogLevel::Error | LogLevel::Fatal => emit!(error),
    }
}
