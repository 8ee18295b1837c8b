//! Error categories, the fixed retry table, and remediation checklists.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::NormalizedError;

/// AWS "missing resource" exception names: `NoSuchDistribution`,
/// `NoSuchFunctionExists`, `NoSuchCloudFrontOriginAccessIdentity`, ...
static NO_SUCH_RESOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^NoSuch[A-Z][A-Za-z]*$").expect("NO_SUCH_RESOURCE should compile - this is a bug")
});

const VALIDATION_NAMES: [&str; 3] =
    ["InvalidArgument", "ValidationException", "PreconditionFailed"];

/// Classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Missing, invalid, or expired credentials.
    Authentication,
    /// Credentials are valid but lack permission.
    Authorization,
    /// The addressed resource does not exist.
    ResourceNotFound,
    /// The API is throttling the caller.
    RateLimit,
    /// The request was rejected as malformed or stale.
    Validation,
    /// Transport failure, timeout, or server-side error.
    Network,
    /// The target resource is in a state that cannot accept the change.
    Configuration,
    /// Nothing else matched.
    Unknown,
}

impl ErrorCategory {
    /// All categories, in categorization priority order.
    pub const ALL: [Self; 8] = [
        Self::Authentication,
        Self::Authorization,
        Self::ResourceNotFound,
        Self::RateLimit,
        Self::Validation,
        Self::Network,
        Self::Configuration,
        Self::Unknown,
    ];

    /// Stable name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "Authentication",
            Self::Authorization => "Authorization",
            Self::ResourceNotFound => "ResourceNotFound",
            Self::RateLimit => "RateLimit",
            Self::Validation => "Validation",
            Self::Network => "Network",
            Self::Configuration => "Configuration",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether and how errors of this category are retried.
    pub const fn retry_strategy(self) -> RetryStrategy {
        match self {
            Self::RateLimit | Self::Network => RetryStrategy::retry(Backoff::Exponential),
            Self::Unknown => RetryStrategy::retry(Backoff::Linear),
            Self::Authentication
            | Self::Authorization
            | Self::ResourceNotFound
            | Self::Validation
            | Self::Configuration => RetryStrategy::NO_RETRY,
        }
    }

    /// Shorthand for `self.retry_strategy().retryable`.
    pub const fn is_retryable(self) -> bool {
        self.retry_strategy().retryable
    }

    /// Ordered operator checklist for a terminal failure of this category.
    pub const fn remediation(self) -> &'static [&'static str] {
        match self {
            Self::Authentication => &[
                "Verify AWS credentials are configured (environment variables, shared profile, or instance role)",
                "Check whether the access key or session token has expired and refresh it",
                "Confirm the active profile targets the expected AWS account",
            ],
            Self::Authorization => &[
                "Verify the IAM policy grants the required CloudFront and S3 permissions for this action",
                "Check for explicit denies in service control policies or permission boundaries",
                "Confirm the resource policy (bucket policy, origin access control) allows the caller",
            ],
            Self::ResourceNotFound => &[
                "Verify the resource identifier (distribution ID, function name, bucket) is spelled correctly",
                "Confirm the resource exists in the targeted account",
                "Check whether the resource was recently deleted or is still being created",
            ],
            Self::RateLimit => &[
                "Reduce request frequency or batch changes into fewer API calls",
                "Wait before re-running; the API is throttling this account",
                "Request a service quota increase if throttling persists",
            ],
            Self::Validation => &[
                "Review the request parameters against the API's documented constraints",
                "Fetch the latest ETag and retry with a matching If-Match header",
                "Validate configuration files before applying them",
            ],
            Self::Network => &[
                "Check network connectivity and DNS resolution for AWS endpoints",
                "Check the AWS Health Dashboard for service disruptions",
                "Increase client timeouts for long-running operations",
            ],
            Self::Configuration => &[
                "Review the distribution and function configuration for inconsistencies",
                "Wait for in-progress deployments to finish before applying further changes",
                "Compare against the last known-good configuration",
            ],
            Self::Unknown => &[
                "Inspect the operation log for the full error details",
                "Re-run with debug logging enabled to capture more context",
                "Escalate to the infrastructure owner if the failure persists",
            ],
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delay growth between retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// `base * 2^(n-1)`, capped.
    Exponential,
    /// `base * n`, capped.
    Linear,
    /// Not retried.
    None,
}

/// Retry eligibility of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetryStrategy {
    /// Whether another attempt may follow.
    pub retryable: bool,
    /// How the delay grows between attempts.
    pub backoff: Backoff,
}

impl RetryStrategy {
    /// Terminal strategy.
    pub const NO_RETRY: Self = Self { retryable: false, backoff: Backoff::None };

    const fn retry(backoff: Backoff) -> Self {
        Self { retryable: true, backoff }
    }
}

/// Classify a normalized error. First match wins; see the module docs for the
/// full table.
pub fn categorize(error: &NormalizedError) -> ErrorCategory {
    let name = error.name.as_deref().unwrap_or_default();
    let message = error.message.as_deref().map(str::to_lowercase).unwrap_or_default();
    let status = error.status_code;

    if name.contains("Credential")
        || contains_any(&message, &["credentials", "authentication"])
        || status == Some(401)
    {
        return ErrorCategory::Authentication;
    }

    if name == "AccessDenied"
        || contains_any(&message, &["accessdenied", "permission"])
        || status == Some(403)
    {
        return ErrorCategory::Authorization;
    }

    if NO_SUCH_RESOURCE.is_match(name)
        || contains_any(&message, &["not found"])
        || status == Some(404)
    {
        return ErrorCategory::ResourceNotFound;
    }

    if name == "TooManyRequests"
        || contains_any(&message, &["rate limit", "throttle"])
        || status == Some(429)
    {
        return ErrorCategory::RateLimit;
    }

    if VALIDATION_NAMES.contains(&name)
        || contains_any(&message, &["validation", "invalid"])
        || matches!(status, Some(400 | 412))
    {
        return ErrorCategory::Validation;
    }

    if name.contains("Network")
        || name.contains("Timeout")
        || contains_any(&message, &["network", "timeout", "connection"])
        || status.is_some_and(|code| code >= 500)
    {
        return ErrorCategory::Network;
    }

    if contains_any(&message, &["configuration", "distribution", "function"]) {
        return ErrorCategory::Configuration;
    }

    ErrorCategory::Unknown
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
