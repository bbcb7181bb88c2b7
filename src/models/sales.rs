//! Sale orders and their product lines.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

/// A sale order raised by a sales person.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaleOrder {
    #[serde(rename = "Sales_Person_Name", default, deserialize_with = "de::string_or_empty")]
    pub sales_person_name: String,
    #[serde(rename = "Total_Invoice_value", default, deserialize_with = "de::opt_f64")]
    pub total_invoice_value: Option<f64>,
    #[serde(rename = "Products_List", default, deserialize_with = "de::null_as_default")]
    pub products: Vec<ProductLine>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SaleOrder {
    /// Invoice value, zero when the backend omitted it.
    pub fn invoice_value(&self) -> f64 {
        self.total_invoice_value.unwrap_or(0.0)
    }

    /// Sum of quantities across all product lines.
    pub fn quantity(&self) -> f64 {
        self.products.iter().map(ProductLine::quantity).sum()
    }
}

/// One product line within a sale order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductLine {
    #[serde(rename = "Total_Qty", default, deserialize_with = "de::opt_f64")]
    pub total_qty: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductLine {
    pub fn quantity(&self) -> f64 {
        self.total_qty.unwrap_or(0.0)
    }
}
