//! Lenient field decoders for vendor payloads.
//!
//! The vendor backend is loose about JSON types: amounts arrive as numbers or
//! numeric strings, identifiers as numbers or strings, and lists as `null`.
//! These helpers normalize that at the ingestion boundary so the aggregation
//! code only ever sees typed values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a number, numeric string, or null into `Option<f64>`.
///
/// Unparseable values decode to `None` rather than failing the whole record.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Decode a string or number identifier into `Option<String>`.
///
/// Empty strings are treated as absent.
pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decode a string or number into a `String`, defaulting to empty.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_id(deserializer)?.unwrap_or_default())
}

/// Decode `null` as the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
