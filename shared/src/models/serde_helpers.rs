//! Serde helpers for tolerant row decoding
//!
//! Rows come from a remote table other tooling also writes to. A single
//! mangled cell must not take the whole zone list down, so optional fields
//! degrade to their default instead of failing the record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Deserialize `Option<T>`, mapping anything unparseable to `None`.
///
/// Used for `geometry` and `center`: values stored as raw strings, wrong
/// shapes or unknown tags count as absent, which downstream turns into
/// fallbacks or a render skip.
pub fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    match T::deserialize(raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(%err, "discarding malformed field value");
            Ok(None)
        }
    }
}

/// Deserialize `T`, treating an explicit `null` as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
