//! Receipt masters and collection receipts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

/// Receipt master entry. Only `credit_amount` contributes to the dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub credit_amount: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Receipt {
    pub fn credit(&self) -> f64 {
        self.credit_amount.unwrap_or(0.0)
    }
}

/// A payment collected against outstanding invoices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionReceipt {
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub amount: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionReceipt {
    /// Collected amount: `total_amount`, falling back to `amount` when it is
    /// missing or zero.
    pub fn collected_amount(&self) -> f64 {
        self.total_amount
            .filter(|v| *v != 0.0)
            .or(self.amount)
            .unwrap_or(0.0)
    }
}
