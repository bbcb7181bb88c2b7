//! Vendor REST backend client.
//!
//! `VendorApi` is the seam between the dashboard aggregation and the external
//! backend. `HttpVendorClient` is the production implementation; tests plug in
//! an in-memory mock.

pub mod endpoints;
pub mod http;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::attendance::{AttendanceRecord, VisitRecord};
use crate::models::branch::BranchFilter;
use crate::models::delivery::{DeliveryRecord, DeliveryReturnRecord, TripSheetRecord};
use crate::models::query::DateRange;
use crate::models::receipt::{CollectionReceipt, Receipt};
use crate::models::route::{RouteCatalogEntry, RouteRef};
use crate::models::sales::SaleOrder;

pub use http::HttpVendorClient;

/// Resolved session context for talking to the vendor backend.
///
/// Replaces process-wide base URL and session state: every call receives the
/// context it runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiContext {
    pub base_url: String,
    pub token: Option<String>,
    pub company_id: String,
    pub user_type_id: String,
}

/// Vendor client error type.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// Transport failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `body` is a bounded snippet kept for logs only.
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    /// `success: false` in the response envelope.
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    /// Payload did not match the expected shape.
    #[error("Invalid payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Longest error text kept from a vendor response.
const MAX_SNIPPET: usize = 256;

/// Trim vendor-supplied text to at most `MAX_SNIPPET` bytes on a char boundary.
pub(crate) fn snippet(text: &str) -> String {
    let text = text.trim();
    if text.len() <= MAX_SNIPPET {
        return text.to_string();
    }
    let mut end = MAX_SNIPPET;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &text[..end], text.len())
}

/// Result type for vendor calls.
pub type VendorResult<T> = Result<T, VendorError>;

/// Response envelope used by every vendor endpoint.
#[derive(Debug, Deserialize)]
pub struct VendorEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T: Default> VendorEnvelope<T> {
    /// Unwrap the payload, treating `success: false` as a failure and a missing
    /// `data` field as an empty payload.
    pub fn into_data(self) -> VendorResult<T> {
        if !self.success {
            return Err(VendorError::Rejected(
                self.message
                    .as_deref()
                    .map(snippet)
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// Read endpoints consumed by the dashboard aggregation.
#[async_trait]
pub trait VendorApi: Send + Sync {
    /// Visit log for a day.
    async fn visit_logs(
        &self,
        ctx: &ApiContext,
        date: NaiveDate,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<VisitRecord>>;

    /// Sale orders by all users for the range.
    async fn sale_orders(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<SaleOrder>>;

    /// Attendance history for the context's user type.
    async fn attendance_history(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<AttendanceRecord>>;

    /// Delivery orders for the range.
    async fn deliveries(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<DeliveryRecord>>;

    async fn trip_sheets(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<TripSheetRecord>>;

    async fn receipts(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<Receipt>>;

    /// Collection receipts. Not branch scoped.
    async fn collection_receipts(
        &self,
        ctx: &ApiContext,
        range: DateRange,
    ) -> VendorResult<Vec<CollectionReceipt>>;

    async fn delivery_returns(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<DeliveryReturnRecord>>;

    /// Routes assigned to one user on a day.
    async fn user_routes(
        &self,
        ctx: &ApiContext,
        date: NaiveDate,
        user_id: &str,
    ) -> VendorResult<Vec<RouteRef>>;

    /// Full route catalog for the context's company.
    async fn route_catalog(&self, ctx: &ApiContext) -> VendorResult<Vec<RouteCatalogEntry>>;
}
