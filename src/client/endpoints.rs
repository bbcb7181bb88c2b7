//! Vendor endpoint paths, relative to the context's base URL.

pub const ATTENDANCE_HISTORY: &str = "api/empAttendance/attendance/history";
pub const VISIT_LOGS: &str = "api/empAttendance/visitLogs";
pub const SALE_ORDERS: &str = "api/sales/saleOrder";
pub const RECEIPT_MASTER: &str = "api/receipt/receiptMaster";
pub const DELIVERY_ORDERS: &str = "api/delivery/deliveryOrderListData";
pub const DELIVERY_TRIP_SHEETS: &str = "api/delivery/deliveryTripSheet";
pub const COLLECTION_RECEIPTS: &str = "api/receipt/collectionReceipts";
pub const USER_ROUTES: &str = "api/masters/setRoutes";

/// Endpoints not pinned down in the vendor's published table. Configurable so
/// they can be corrected without a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionalEndpoints {
    pub delivery_returns: String,
    pub route_catalog: String,
}

impl Default for ProvisionalEndpoints {
    fn default() -> Self {
        Self {
            delivery_returns: "api/delivery/deliveryReturn".to_string(),
            route_catalog: "api/masters/routes".to_string(),
        }
    }
}
