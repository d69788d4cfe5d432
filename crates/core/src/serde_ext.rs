//! Serde helpers for request and update payloads.

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Deserialize a field so that "present" is distinguishable from "absent".
///
/// Use with `#[serde(default)]`: an absent key stays `None`, an explicit
/// `null` becomes `Some(None)`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserialize a loosely typed value, such as a query parameter, treating
/// anything that does not parse as absent.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}
