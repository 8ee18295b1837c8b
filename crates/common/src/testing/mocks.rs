//! Mock operations and sinks.

use std::collections::VecDeque;
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::NormalizedError;
use crate::observability::{LogEntry, LogSink, SinkError};

type Script<T> = Arc<Mutex<VecDeque<Result<T, NormalizedError>>>>;

/// Fake remote call returning scripted results in order.
///
/// Once the script runs out, the `repeat` result (if any) is returned
/// forever; otherwise an "exhausted" error is returned. Clones share state.
#[derive(Debug)]
pub struct ScriptedOperation<T> {
    script: Script<T>,
    repeat: Option<Result<T, NormalizedError>>,
    calls: Arc<AtomicU32>,
    call_times: Arc<Mutex<Vec<Instant>>>,
}

impl<T> Clone for ScriptedOperation<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            repeat: self.repeat.clone(),
            calls: Arc::clone(&self.calls),
            call_times: Arc::clone(&self.call_times),
        }
    }
}

impl<T: Clone> ScriptedOperation<T> {
    pub fn new<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<T, NormalizedError>>,
    {
        Self {
            script: Arc::new(Mutex::new(results.into_iter().collect())),
            repeat: None,
            calls: Arc::new(AtomicU32::new(0)),
            call_times: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Operation that fails with `error` on every call.
    pub fn always_failing(error: NormalizedError) -> Self {
        Self::new([]).then_repeat(Err(error))
    }

    /// Result returned once the script is exhausted.
    #[must_use]
    pub fn then_repeat(mut self, result: Result<T, NormalizedError>) -> Self {
        self.repeat = Some(result);
        self
    }

    /// Invoke the fake call.
    pub fn call(&self) -> Ready<Result<T, NormalizedError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().push(Instant::now());

        let next = self.script.lock().pop_front();
        ready(next.or_else(|| self.repeat.clone()).unwrap_or_else(|| {
            Err(NormalizedError::with_message("scripted operation exhausted"))
        }))
    }

    /// Number of times [`call`](Self::call) ran.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Time between consecutive calls, on tokio's clock.
    pub fn gaps(&self) -> Vec<Duration> {
        self.call_times.lock().windows(2).map(|pair| pair[1] - pair[0]).collect()
    }
}

/// Sink that rejects every entry and counts how often it was asked.
#[derive(Debug, Default)]
pub struct FailingLogSink {
    appends: AtomicU32,
}

impl FailingLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appends(&self) -> u32 {
        self.appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogSink for FailingLogSink {
    async fn append(&self, _entry: &LogEntry) -> Result<(), SinkError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Unavailable("disk full".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_results_then_exhausted() {
        let op = ScriptedOperation::new([Err(NormalizedError::with_status(503)), Ok(1)]);

        assert!(op.call().await.is_err());
        assert_eq!(op.call().await, Ok(1));
        let exhausted = op.call().await.expect_err("script is empty");
        assert_eq!(exhausted.message.as_deref(), Some("scripted operation exhausted"));
        assert_eq!(op.calls(), 3);
    }

    #[tokio::test]
    async fn test_always_failing_repeats() {
        let op = ScriptedOperation::<()>::always_failing(NormalizedError::named("TooManyRequests"));
        for _ in 0..5 {
            assert!(op.call().await.is_err());
        }
        assert_eq!(op.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gaps_follow_tokio_clock() {
        let op = ScriptedOperation::new([Ok(()), Ok(())]);
        let _ = op.call().await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        let _ = op.call().await;
        assert_eq!(op.gaps(), vec![Duration::from_millis(250)]);
    }
}
