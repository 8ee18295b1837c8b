//! Run a simulated CloudFront invalidation through the resilient executor.
//!
//! The fake API throttles the first two requests, then succeeds. Entries are
//! written to `operations.jsonl` in a temp directory and echoed to stderr.
//!
//! Run with: `cargo run -p cdnguard-infra --example invalidate_with_retry`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cdnguard_common::error::NormalizedError;
use cdnguard_infra::config::{apply_env_overrides, Config};
use cdnguard_infra::{build_executor, init_tracing, read_log_file, CloudFrontOperations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("operations.jsonl");

    let mut config = apply_env_overrides(Config::default(), |key| std::env::var(key).ok())?;
    config.executor.base_delay = Duration::from_millis(200);
    config.logging.log_path = Some(log_path.clone());
    init_tracing(&config.logging)?;

    let cloudfront = CloudFrontOperations::new(Arc::new(build_executor(&config)?));
    let requests = AtomicU32::new(0);

    let invalidation = cloudfront
        .distribution_operation("E2QWRUHAPOMQZL", "invalidation", || {
            let request = requests.fetch_add(1, Ordering::SeqCst);
            async move {
                if request < 2 {
                    Err(NormalizedError::named("TooManyRequests").message("Rate exceeded"))
                } else {
                    Ok("I2J0I21PCUYOIK")
                }
            }
        })
        .await;

    match invalidation {
        Ok(id) => tracing::info!(invalidation_id = id, "Invalidation created"),
        Err(error) => tracing::error!("{}", error.report()),
    }

    for entry in read_log_file(&log_path).await? {
        println!("{}", serde_json::to_string(&entry)?);
    }
    Ok(())
}
