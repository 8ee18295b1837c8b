//! Error normalization and categorization for remote management calls.
//!
//! Remote APIs (the AWS SDK in particular) fail with errors whose only stable
//! traits are a name (`AccessDenied`, `TooManyRequests`, ...), a message, and
//! sometimes an HTTP status code. This module turns any such error into a
//! [`NormalizedError`] once, at the boundary, and classifies it into one of
//! eight [`ErrorCategory`] values. The category drives retry eligibility
//! ([`RetryStrategy`]) and the remediation checklist attached to a terminal
//! failure.
//!
//! ## Categorization order
//!
//! | Order | Category | Name | Message (case-insensitive) | Status |
//! |-------|----------|------|----------------------------|--------|
//! | 1 | Authentication | contains `Credential` | `credentials`, `authentication` | 401 |
//! | 2 | Authorization | `AccessDenied` | `accessdenied`, `permission` | 403 |
//! | 3 | ResourceNotFound | `NoSuch<Thing>` | `not found` | 404 |
//! | 4 | RateLimit | `TooManyRequests` | `rate limit`, `throttle` | 429 |
//! | 5 | Validation | `InvalidArgument`, `ValidationException`, `PreconditionFailed` | `validation`, `invalid` | 400, 412 |
//! | 6 | Network | contains `Network`, `Timeout` | `network`, `timeout`, `connection` | >= 500 |
//! | 7 | Configuration | | `configuration`, `distribution`, `function` | |
//! | 8 | Unknown | | | |
//!
//! The first matching row wins. The order is fixed: a 500 whose message says
//! "invalid" is a Validation error, not a Network one.
//!
//! ## Example
//!
//! ```rust
//! use cdnguard_common::error::{categorize, ErrorCategory, NormalizedError};
//!
//! let throttled = NormalizedError::named("TooManyRequests");
//! let category = categorize(&throttled);
//!
//! assert_eq!(category, ErrorCategory::RateLimit);
//! assert!(category.retry_strategy().retryable);
//! ```

mod category;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::category::{categorize, Backoff, ErrorCategory, RetryStrategy};

/// Stable shape of a remote-call failure.
///
/// Every field is optional because remote errors are inconsistent: SDK
/// service errors carry a name and status, transport errors often only a
/// message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    /// Exception/error code name, e.g. `NoSuchDistribution`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// HTTP-like status code, when the transport reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl NormalizedError {
    /// Error with only a name.
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    /// Error with only a message.
    pub fn with_message<S: Into<String>>(message: S) -> Self {
        Self { message: Some(message.into()), ..Self::default() }
    }

    /// Error with only a status code.
    pub fn with_status(status_code: u16) -> Self {
        Self { status_code: Some(status_code), ..Self::default() }
    }

    /// Set the name.
    #[must_use]
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the message.
    #[must_use]
    pub fn message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the status code.
    #[must_use]
    pub fn status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Category of this error. Shorthand for [`categorize`].
    pub fn category(&self) -> ErrorCategory {
        categorize(self)
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.message) {
            (Some(name), Some(message)) => write!(f, "{name}: {message}")?,
            (Some(name), None) => write!(f, "{name}")?,
            (None, Some(message)) => write!(f, "{message}")?,
            (None, None) => write!(f, "unknown error")?,
        }
        if let Some(status) = self.status_code {
            write!(f, " (status {status})")?;
        }
        Ok(())
    }
}

impl std::error::Error for NormalizedError {}

/// Conversion from an operation's error type into a [`NormalizedError`].
///
/// Implement this for the error type returned by the wrapped remote call so
/// the executor can categorize it without probing the concrete type.
///
/// ```rust,ignore
/// impl ErrorShape for SdkFailure {
///     fn normalize(&self) -> NormalizedError {
///         NormalizedError {
///             name: self.code().map(str::to_string),
///             message: Some(self.to_string()),
///             status_code: self.http_status(),
///         }
///     }
/// }
/// ```
pub trait ErrorShape {
    /// Build the normalized view of this error.
    fn normalize(&self) -> NormalizedError;
}

impl ErrorShape for NormalizedError {
    fn normalize(&self) -> NormalizedError {
        self.clone()
    }
}

impl<T: ErrorShape + ?Sized> ErrorShape for Box<T> {
    fn normalize(&self) -> NormalizedError {
        (**self).normalize()
    }
}

impl ErrorShape for std::io::Error {
    fn normalize(&self) -> NormalizedError {
        use std::io::ErrorKind;

        let name = match self.kind() {
            ErrorKind::TimedOut => Some("NetworkTimeout"),
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected => Some("NetworkError"),
            ErrorKind::PermissionDenied => Some("AccessDenied"),
            ErrorKind::InvalidInput => Some("InvalidArgument"),
            _ => None,
        };
        NormalizedError {
            name: name.map(str::to_string),
            message: Some(self.to_string()),
            status_code: None,
        }
    }
}
