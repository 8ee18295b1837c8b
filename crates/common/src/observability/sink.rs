//! Append-only log sinks.

use std::fmt::Debug;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use super::entry::LogEntry;

/// Failure to append an entry. The executor reports it on the fallback
/// channel and carries on.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to serialize log entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write log entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("log sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for [`LogEntry`] records.
///
/// Implementations must be append-only and safe under concurrent callers:
/// the same sink is shared by every `execute` call of an executor.
#[async_trait]
pub trait LogSink: Send + Sync + Debug {
    /// Append one entry.
    async fn append(&self, entry: &LogEntry) -> Result<(), SinkError>;
}

/// Sink that keeps entries in memory, in append order.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn append(&self, entry: &LogEntry) -> Result<(), SinkError> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpLogSink;

#[async_trait]
impl LogSink for NoOpLogSink {
    async fn append(&self, _entry: &LogEntry) -> Result<(), SinkError> {
        Ok(())
    }
}
