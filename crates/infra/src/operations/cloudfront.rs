//! CloudFront operation helpers.
//!
//! Each helper runs the caller's operation through the shared executor with a
//! consistent operation name and context, so log entries and failures for the
//! same resource line up.

use std::future::Future;
use std::sync::Arc;

use cdnguard_common::error::ErrorShape;
use cdnguard_common::resilience::{EnrichedError, ExecutionContext, ResilientExecutor};

const RESOURCE_TYPE: &str = "resource_type";

/// Executor front for CloudFront distributions and functions.
#[derive(Debug, Clone)]
pub struct CloudFrontOperations {
    executor: Arc<ResilientExecutor>,
}

impl CloudFrontOperations {
    pub fn new(executor: Arc<ResilientExecutor>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &ResilientExecutor {
        &self.executor
    }

    /// Run `operation` against a distribution, named
    /// `CloudFront distribution <action>`.
    ///
    /// # Errors
    /// Returns the executor's [`EnrichedError`] on terminal failure.
    pub async fn distribution_operation<F, Fut, T, E>(
        &self,
        distribution_id: &str,
        action: &str,
        operation: F,
    ) -> Result<T, EnrichedError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorShape,
    {
        let name = format!("CloudFront distribution {action}");
        self.executor.execute(&name, distribution_context(distribution_id), operation).await
    }

    /// Run `operation` against a CloudFront function, named
    /// `CloudFront function <action>`.
    ///
    /// # Errors
    /// Returns the executor's [`EnrichedError`] on terminal failure.
    pub async fn function_operation<F, Fut, T, E>(
        &self,
        function_name: &str,
        action: &str,
        operation: F,
    ) -> Result<T, EnrichedError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorShape,
    {
        let name = format!("CloudFront function {action}");
        let context = ExecutionContext::new()
            .with(RESOURCE_TYPE, "function")
            .with("function_name", function_name);
        self.executor.execute(&name, context, operation).await
    }

    /// Run a distribution config update guarded by `etag` (sent as
    /// `If-Match`).
    ///
    /// A stale ETag surfaces as `PreconditionFailed` and is not retried;
    /// callers re-fetch the config and try again.
    ///
    /// # Errors
    /// Returns the executor's [`EnrichedError`] on terminal failure.
    pub async fn configuration_update<F, Fut, T, E>(
        &self,
        distribution_id: &str,
        etag: &str,
        operation: F,
    ) -> Result<T, EnrichedError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorShape,
    {
        let context = distribution_context(distribution_id).with("if_match", etag);
        self.executor
            .execute("CloudFront distribution configuration update", context, operation)
            .await
    }
}

fn distribution_context(distribution_id: &str) -> ExecutionContext {
    ExecutionContext::new()
        .with(RESOURCE_TYPE, "distribution")
        .with("distribution_id", distribution_id)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cdnguard_common::error::{ErrorCategory, NormalizedError};
    use cdnguard_common::observability::MemoryLogSink;
    use cdnguard_common::resilience::ExecutorConfig;
    use serde_json::json;

    use super::*;

    fn operations() -> (CloudFrontOperations, Arc<MemoryLogSink>) {
        let sink = Arc::new(MemoryLogSink::new());
        let config = ExecutorConfig::builder()
            .max_retries(1)
            .base_delay(Duration::from_millis(10))
            .build()
            .expect("valid config");
        (CloudFrontOperations::new(Arc::new(ResilientExecutor::new(config, sink.clone()))), sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_distribution_operation_names_and_context() {
        let (cloudfront, sink) = operations();

        let status = cloudfront
            .distribution_operation("E2QWRUHAPOMQZL", "status check", || async {
                Ok::<_, NormalizedError>("Deployed")
            })
            .await
            .expect("succeeds");

        assert_eq!(status, "Deployed");
        let entry = &sink.entries()[0];
        assert_eq!(entry.metadata.operation, "CloudFront distribution status check");
        assert_eq!(entry.metadata.context.get(RESOURCE_TYPE), Some(&json!("distribution")));
        assert_eq!(entry.metadata.context.get("distribution_id"), Some(&json!("E2QWRUHAPOMQZL")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_function_operation_context() {
        let (cloudfront, _sink) = operations();

        let err = cloudfront
            .function_operation("url-rewrite", "publish", || async {
                Err::<(), _>(NormalizedError::named("NoSuchFunctionExists"))
            })
            .await
            .expect_err("missing function");

        assert_eq!(err.operation(), "CloudFront function publish");
        assert_eq!(err.category(), ErrorCategory::ResourceNotFound);
        assert_eq!(err.context().get("function_name"), Some(&json!("url-rewrite")));
        assert_eq!(err.context().get(RESOURCE_TYPE), Some(&json!("function")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_configuration_update_carries_etag() {
        let (cloudfront, sink) = operations();

        let err = cloudfront
            .configuration_update("E2QWRUHAPOMQZL", "E3UN6WX5RRO2AG", || async {
                Err::<(), _>(NormalizedError::named("PreconditionFailed").status(412))
            })
            .await
            .expect_err("stale etag");

        assert_eq!(err.operation(), "CloudFront distribution configuration update");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.attempts(), 1);
        assert_eq!(err.context().get("if_match"), Some(&json!("E3UN6WX5RRO2AG")));
        assert_eq!(err.context().len(), 3);
        assert!(sink.entries().iter().all(|e| e.metadata.context == *err.context()));
    }
}
