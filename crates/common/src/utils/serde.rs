//! Serde adapters used by configuration types.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// `Duration` as a whole number of milliseconds.
///
/// Config files express delays as `base_delay_ms = 1000`; this keeps the Rust
/// side typed as `Duration`.
///
/// ```rust
/// use std::time::Duration;
///
/// use cdnguard_common::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Backoff {
///     #[serde(with = "duration_millis")]
///     base_delay_ms: Duration,
/// }
/// ```
pub mod duration_millis {
    use serde::ser::Error as SerError;

    use super::{Deserialize, Deserializer, Duration, Serializer};

    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize a `Duration` as milliseconds, rejecting values above `u64::MAX`.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).map_err(|_| {
            SerError::custom("duration too large to fit into a 64-bit millisecond representation")
        })?;
        serializer.serialize_u64(millis)
    }

    /// Deserialize milliseconds into a `Duration`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
