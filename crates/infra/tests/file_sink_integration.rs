//! Integration tests for the JSON-lines file sink
//!
//! Runs the executor against a real log file and reads it back.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use cdnguard_common::error::{ErrorCategory, NormalizedError};
use cdnguard_common::observability::{EntryKind, LogSink};
use cdnguard_common::resilience::{ExecutionContext, ExecutorConfig, ResilientExecutor};
use cdnguard_common::testing::ScriptedOperation;
use cdnguard_infra::{read_log_file, FileLogSink};
use serde_json::json;
use tempfile::TempDir;

fn config(max_retries: u32) -> ExecutorConfig {
    ExecutorConfig::builder()
        .max_retries(max_retries)
        .base_delay(Duration::from_millis(100))
        .build()
        .expect("valid config")
}

/// A throttled call that eventually fails leaves a complete, parseable trail.
///
/// # Test Steps
/// 1. Run an always-throttled operation with two retries against a file sink
/// 2. Read the file back
/// 3. Verify kinds, attempts, delays, and remediation on the terminal entry
#[tokio::test(start_paused = true)]
async fn executor_writes_complete_trail() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("operations.jsonl");
    let sink = Arc::new(FileLogSink::open(&path)?);
    let executor = ResilientExecutor::new(config(2), sink);

    let op = ScriptedOperation::<()>::always_failing(
        NormalizedError::named("TooManyRequests").message("Rate exceeded"),
    );
    let context = ExecutionContext::new().with("distribution_id", "E2QWRUHAPOMQZL");
    let error = executor
        .execute("CloudFront distribution invalidation", context, || op.call())
        .await
        .expect_err("throttling never clears");
    assert_eq!(error.attempts(), 3);

    let entries = read_log_file(&path).await?;
    let kinds: Vec<EntryKind> = entries.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EntryKind::AttemptStarted,
            EntryKind::AttemptFailed,
            EntryKind::AttemptStarted,
            EntryKind::AttemptFailed,
            EntryKind::AttemptStarted,
            EntryKind::AttemptFailed,
            EntryKind::OperationFailed,
        ]
    );

    let delays: Vec<u64> = entries.iter().filter_map(|e| e.metadata.delay_ms).collect();
    assert_eq!(delays.len(), 2);
    assert!((100..110).contains(&delays[0]), "first delay {}", delays[0]);
    assert!((200..220).contains(&delays[1]), "second delay {}", delays[1]);

    let terminal = entries.last().expect("terminal entry");
    assert_eq!(terminal.metadata.attempt, 3);
    assert_eq!(terminal.metadata.category, Some(ErrorCategory::RateLimit));
    assert_eq!(terminal.error_name.as_deref(), Some("TooManyRequests"));
    assert!(!terminal.metadata.remediation.is_empty());
    for entry in &entries {
        assert_eq!(entry.metadata.operation, "CloudFront distribution invalidation");
        assert_eq!(entry.metadata.context.get("distribution_id"), Some(&json!("E2QWRUHAPOMQZL")));
        let expected_category = match entry.kind {
            EntryKind::AttemptStarted => None,
            EntryKind::AttemptFailed | EntryKind::OperationFailed => {
                Some(ErrorCategory::RateLimit)
            }
        };
        assert_eq!(entry.metadata.category, expected_category, "{:?}", entry.kind);
    }
    Ok(())
}

/// Concurrent appends produce only whole, well-formed lines.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_produce_well_formed_lines() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("operations.jsonl");
    let sink: Arc<dyn LogSink> = Arc::new(FileLogSink::open(&path)?);
    let executor = Arc::new(ResilientExecutor::new(config(0), sink));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let executor = Arc::clone(&executor);
            tokio::spawn(async move {
                let context = ExecutionContext::new().with("worker", i);
                executor
                    .execute("CloudFront function describe", context, || async move {
                        if i % 2 == 0 {
                            Ok(i)
                        } else {
                            Err(NormalizedError::with_status(404))
                        }
                    })
                    .await
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.await?;
    }

    // 8 successes (1 entry each) + 8 not-found failures (3 entries each).
    let entries = read_log_file(&path).await?;
    assert_eq!(entries.len(), 8 + 8 * 3);

    let raw = std::fs::read_to_string(&path)?;
    assert!(raw.ends_with('\n'));
    assert_eq!(raw.lines().count(), entries.len());

    let workers: HashSet<i64> = entries
        .iter()
        .filter_map(|e| e.metadata.context.get("worker").and_then(|v| v.as_i64()))
        .collect();
    assert_eq!(workers.len(), 16);
    Ok(())
}
