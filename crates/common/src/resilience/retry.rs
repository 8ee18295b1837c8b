//! Executor configuration and backoff delay calculation.
//!
//! For retry number `n` (1-based, the retry about to run):
//! - exponential: `min(base * 2^(n-1), max)`
//! - linear: `min(base * n, max)`
//! - none: no retry
//!
//! [`apply_jitter`] then adds a uniformly random `[0, 10%)` of the capped
//! delay, floored to whole milliseconds, so concurrent callers do not retry
//! in lockstep.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Backoff;
use crate::observability::LogLevel;
use crate::utils::serde::duration_millis;

/// Largest jitter as a fraction of the computed delay.
pub const JITTER_RATIO: f64 = 0.1;

/// Invalid executor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_delay ({max_delay:?}) must not be smaller than base_delay ({base_delay:?})")]
    DelayBounds { base_delay: Duration, max_delay: Duration },
}

/// Executor tuning, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Delay unit for both backoff shapes.
    #[serde(rename = "base_delay_ms", with = "duration_millis")]
    pub base_delay: Duration,
    /// Upper bound on the pre-jitter delay.
    #[serde(rename = "max_delay_ms", with = "duration_millis")]
    pub max_delay: Duration,
    /// Minimum level echoed to the console through `tracing`.
    pub console_level: LogLevel,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            console_level: LogLevel::Info,
        }
    }
}

impl ExecutorConfig {
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::new()
    }

    /// Total attempt budget.
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_delay < self.base_delay {
            return Err(ConfigError::DelayBounds {
                base_delay: self.base_delay,
                max_delay: self.max_delay,
            });
        }
        Ok(())
    }

    /// Pre-jitter delay before retry `retry` (1-based) under this config.
    pub fn backoff_delay(&self, backoff: Backoff, retry: u32) -> Option<Duration> {
        backoff_delay(backoff, retry, self.base_delay, self.max_delay)
    }
}

/// Builder for [`ExecutorConfig`].
#[derive(Debug, Default)]
pub struct ExecutorConfigBuilder {
    config: ExecutorConfig,
}

impl ExecutorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    pub fn console_level(mut self, level: LogLevel) -> Self {
        self.config.console_level = level;
        self
    }

    pub fn build(self) -> Result<ExecutorConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Pre-jitter delay for retry number `retry` (1-based; 0 is treated as 1).
/// Returns `None` for [`Backoff::None`]. Saturates instead of overflowing.
pub fn backoff_delay(
    backoff: Backoff,
    retry: u32,
    base_delay: Duration,
    max_delay: Duration,
) -> Option<Duration> {
    let retry = retry.max(1);
    let base_ms = whole_millis(base_delay);
    let max_ms = whole_millis(max_delay);

    let delay_ms = match backoff {
        Backoff::Exponential => {
            let factor = 1u64.checked_shl(retry - 1).unwrap_or(u64::MAX);
            base_ms.saturating_mul(factor)
        }
        Backoff::Linear => base_ms.saturating_mul(u64::from(retry)),
        Backoff::None => return None,
    };

    Some(Duration::from_millis(delay_ms.min(max_ms)))
}

/// Add up to [`JITTER_RATIO`] of `delay`, drawn from the thread RNG, and
/// floor to whole milliseconds.
pub fn apply_jitter(delay: Duration) -> Duration {
    let delay_ms = whole_millis(delay) as f64;
    let jitter_ms = rand::thread_rng().gen::<f64>() * JITTER_RATIO * delay_ms;
    Duration::from_millis((delay_ms + jitter_ms).floor() as u64)
}

pub(crate) fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
