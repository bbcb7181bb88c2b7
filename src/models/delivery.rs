//! Delivery orders, trip sheets, and delivery returns.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Delivery state as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum DeliveryStatus {
    Delivered,
    Pending,
    Return,
    Other(String),
    #[default]
    Unknown,
}

impl DeliveryStatus {
    /// Statuses counted in the numerator of the delivery ratio.
    pub fn is_tracked(&self) -> bool {
        matches!(self, Self::Delivered | Self::Pending | Self::Return)
    }
}

/// Any non-string status decodes as `Unknown` instead of failing the record.
impl<'de> Deserialize<'de> for DeliveryStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Self::from(s),
            _ => Self::Unknown,
        })
    }
}

impl From<String> for DeliveryStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Delivered" => Self::Delivered,
            "Pending" => Self::Pending,
            "Return" => Self::Return,
            "" => Self::Unknown,
            _ => Self::Other(value),
        }
    }
}

impl From<DeliveryStatus> for String {
    fn from(value: DeliveryStatus) -> Self {
        match value {
            DeliveryStatus::Delivered => "Delivered".to_string(),
            DeliveryStatus::Pending => "Pending".to_string(),
            DeliveryStatus::Return => "Return".to_string(),
            DeliveryStatus::Other(s) => s,
            DeliveryStatus::Unknown => String::new(),
        }
    }
}

/// One delivery order scheduled for the day.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeliveryRecord {
    #[serde(
        rename = "DeliveryStatusName",
        default,
        deserialize_with = "super::de::null_as_default"
    )]
    pub status: DeliveryStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A delivery person's route manifest. Passed through uninterpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripSheetRecord(pub Map<String, Value>);

/// A returned delivery. Passed through uninterpreted; only counted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryReturnRecord(pub Map<String, Value>);
