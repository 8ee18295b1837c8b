//! Append-only JSON-lines log file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cdnguard_common::observability::{LogEntry, LogSink, SinkError};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::errors::{InfraError, InfraResult};

/// Sink writing one JSON object per line.
///
/// Each entry is serialized up front and written with a single `write_all`
/// while holding the file lock, so concurrent callers never interleave
/// partial lines.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLogSink {
    /// Open `path` for appending, creating it and its parent directories.
    ///
    /// # Errors
    /// Returns [`InfraError::SinkOpen`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> InfraResult<Self> {
        let path = path.as_ref().to_path_buf();
        let sink_open = |source| InfraError::SinkOpen { path: path.clone(), source };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(sink_open)?;
        }
        let file =
            std::fs::OpenOptions::new().create(true).append(true).open(&path).map_err(sink_open)?;

        Ok(Self { file: Mutex::new(File::from_std(file)), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSink for FileLogSink {
    async fn append(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Read a JSON-lines log back into entries. Blank lines are skipped.
///
/// # Errors
/// Returns [`InfraError::LogRead`] if the file cannot be read and
/// [`InfraError::LogParse`] (with the 1-based line number) for a malformed
/// line.
pub async fn read_log_file(path: impl AsRef<Path>) -> InfraResult<Vec<LogEntry>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InfraError::LogRead { path: path.to_path_buf(), source })?;

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| InfraError::LogParse {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })
        })
        .collect()
}
