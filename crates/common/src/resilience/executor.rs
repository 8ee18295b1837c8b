//! The resilient operation executor and its terminal error.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::context::ExecutionContext;
use super::retry::{apply_jitter, whole_millis, ExecutorConfig};
use crate::error::{categorize, ErrorCategory, ErrorShape, NormalizedError, RetryStrategy};
use crate::observability::{
    echo, EntryKind, EntryMetadata, LogEntry, LogSink, NoOpLogSink, FALLBACK_TARGET,
};

/// Name used when `execute` is given a blank operation name.
pub const UNNAMED_OPERATION: &str = "unnamed operation";

/// Terminal failure of an `execute` call.
///
/// Built once, from the last attempt's error, when the attempt budget is
/// spent or the error's category is not retryable.
#[derive(Debug)]
pub struct EnrichedError<E> {
    error: E,
    normalized: NormalizedError,
    operation: String,
    category: ErrorCategory,
    context: ExecutionContext,
    attempts: u32,
    timestamp: DateTime<Utc>,
}

impl<E> EnrichedError<E> {
    fn new(
        error: E,
        normalized: NormalizedError,
        operation: &str,
        category: ErrorCategory,
        context: ExecutionContext,
        attempts: u32,
    ) -> Self {
        Self {
            error,
            normalized,
            operation: operation.to_string(),
            category,
            context,
            attempts,
            timestamp: Utc::now(),
        }
    }

    /// The original error returned by the last attempt.
    pub const fn error(&self) -> &E {
        &self.error
    }

    /// Take the original error.
    pub fn into_inner(self) -> E {
        self.error
    }

    /// The last error as seen by the categorizer.
    pub const fn normalized(&self) -> &NormalizedError {
        &self.normalized
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    pub const fn retry_strategy(&self) -> RetryStrategy {
        self.category.retry_strategy()
    }

    pub const fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Attempts made, including the first.
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Ordered remediation checklist for the category.
    pub const fn remediation(&self) -> &'static [&'static str] {
        self.category.remediation()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Multi-line operator report: headline, context, and numbered steps.
    pub fn report(&self) -> String {
        let mut report = format!(
            "{} failed ({}) after {} attempt(s): {}",
            self.operation, self.category, self.attempts, self.normalized
        );
        if !self.context.is_empty() {
            report.push_str(&format!("\ncontext: {}", self.context));
        }
        report.push_str("\nremediation:");
        for (i, step) in self.remediation().iter().enumerate() {
            report.push_str(&format!("\n  {}. {step}", i + 1));
        }
        report
    }
}

impl<E> fmt::Display for EnrichedError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed after {} attempt(s) [{}]: {}",
            self.operation, self.attempts, self.category, self.normalized
        )
    }
}

impl<E> std::error::Error for EnrichedError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Lets an enriched error from an inner call flow through an outer executor.
impl<E> ErrorShape for EnrichedError<E> {
    fn normalize(&self) -> NormalizedError {
        self.normalized.clone()
    }
}

/// Runs remote operations with categorized retry and structured logging.
///
/// Holds only read-only configuration and a shared append-only sink, so one
/// executor can serve any number of concurrent `execute` calls.
#[derive(Debug, Clone)]
pub struct ResilientExecutor {
    config: ExecutorConfig,
    sink: Arc<dyn LogSink>,
}

impl Default for ResilientExecutor {
    fn default() -> Self {
        Self::without_sink(ExecutorConfig::default())
    }
}

impl ResilientExecutor {
    pub fn new(config: ExecutorConfig, sink: Arc<dyn LogSink>) -> Self {
        Self { config, sink }
    }

    /// Executor whose entries only reach the console echo.
    pub fn without_sink(config: ExecutorConfig) -> Self {
        Self::new(config, Arc::new(NoOpLogSink))
    }

    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails with a non-retryable
    /// category, or the attempt budget is spent.
    ///
    /// # Errors
    /// Returns the [`EnrichedError`] built from the last attempt's error.
    #[instrument(
        skip(self, context, operation),
        fields(max_attempts = self.config.max_attempts())
    )]
    pub async fn execute<F, Fut, T, E>(
        &self,
        operation_name: &str,
        context: ExecutionContext,
        mut operation: F,
    ) -> Result<T, EnrichedError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorShape,
    {
        let operation_name = if operation_name.trim().is_empty() {
            warn!("execute called without an operation name");
            UNNAMED_OPERATION
        } else {
            operation_name
        };
        let max_attempts = self.config.max_attempts();
        let call_id = Uuid::new_v4();
        let metadata = |attempt: u32| EntryMetadata {
            operation: operation_name.to_string(),
            call_id,
            attempt,
            max_attempts,
            category: None,
            delay_ms: None,
            remediation: Vec::new(),
            context: context.clone(),
        };

        let mut attempt = 0;
        loop {
            attempt += 1;

            let started = LogEntry::new(EntryKind::AttemptStarted, metadata(attempt)).with_message(
                format!("Attempting {operation_name} (attempt {attempt}/{max_attempts})"),
            );
            self.record(started).await;

            let error = match operation().await {
                Ok(value) => {
                    debug!(operation = operation_name, attempt, "Operation succeeded");
                    return Ok(value);
                }
                Err(error) => error,
            };

            let normalized = error.normalize();
            let category = categorize(&normalized);
            let delay = self.next_delay(category, attempt);

            let mut failed =
                LogEntry::new(EntryKind::AttemptFailed, metadata(attempt)).with_error(&normalized);
            failed.metadata.category = Some(category);
            failed.metadata.delay_ms = delay.map(whole_millis);
            self.record(failed).await;

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
                continue;
            }

            let mut terminal = LogEntry::new(EntryKind::OperationFailed, metadata(attempt))
                .with_message(format!(
                    "{operation_name} failed after {attempt} attempt(s) ({category})"
                ))
                .with_error(&normalized);
            terminal.metadata.category = Some(category);
            terminal.metadata.remediation =
                category.remediation().iter().map(|step| (*step).to_string()).collect();
            self.record(terminal).await;

            return Err(EnrichedError::new(
                error,
                normalized,
                operation_name,
                category,
                context,
                attempt,
            ));
        }
    }

    /// Jittered delay before the next attempt, or `None` when the call ends
    /// here.
    fn next_delay(&self, category: ErrorCategory, attempt: u32) -> Option<Duration> {
        let strategy = category.retry_strategy();
        if !strategy.retryable || attempt >= self.config.max_attempts() {
            return None;
        }
        self.config.backoff_delay(strategy.backoff, attempt).map(apply_jitter)
    }

    async fn record(&self, entry: LogEntry) {
        if entry.level >= self.config.console_level {
            echo(&entry);
        }
        if let Err(error) = self.sink.append(&entry).await {
            warn!(
                target: FALLBACK_TARGET,
                error = %error,
                operation = %entry.metadata.operation,
                kind = entry.kind.as_str(),
                "Failed to append log entry"
            );
        }
    }
}
