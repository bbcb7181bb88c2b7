//! In-memory `VendorApi` for unit tests, with failure injection and call log.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{ApiContext, VendorApi, VendorError, VendorResult};
use crate::models::attendance::{AttendanceRecord, VisitRecord};
use crate::models::branch::BranchFilter;
use crate::models::delivery::{DeliveryRecord, DeliveryReturnRecord, TripSheetRecord};
use crate::models::query::DateRange;
use crate::models::receipt::{CollectionReceipt, Receipt};
use crate::models::route::{RouteCatalogEntry, RouteRef};
use crate::models::sales::SaleOrder;
use crate::services::dashboard::Source;

/// One recorded vendor call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub source: Source,
    pub branch: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Default)]
pub struct MockVendor {
    pub visits: Vec<VisitRecord>,
    pub sale_orders: Vec<SaleOrder>,
    pub attendance: Vec<AttendanceRecord>,
    pub deliveries: Vec<DeliveryRecord>,
    pub trip_sheets: Vec<TripSheetRecord>,
    pub receipts: Vec<Receipt>,
    pub collections: Vec<CollectionReceipt>,
    pub delivery_returns: Vec<DeliveryReturnRecord>,
    pub routes: HashMap<String, Vec<RouteRef>>,
    pub catalog: Vec<RouteCatalogEntry>,
    pub failing: HashSet<Source>,
    pub failing_route_users: HashSet<String>,
    pub catalog_fails: bool,
    /// Number of upcoming sale-order calls that panic.
    pub sale_order_panics: AtomicUsize,
    /// Number of upcoming route-catalog calls that panic.
    pub catalog_panics: AtomicUsize,
    pub(crate) calls: Mutex<Vec<Call>>,
    pub(crate) catalog_calls: AtomicUsize,
}

impl MockVendor {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len() + self.catalog_calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, source: Source) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.source == source)
            .collect()
    }

    pub fn catalog_call_count(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    fn respond<T: Clone>(
        &self,
        ctx: &ApiContext,
        source: Source,
        branch: Option<&BranchFilter>,
        data: &[T],
    ) -> VendorResult<Vec<T>> {
        self.calls.lock().unwrap().push(Call {
            source,
            branch: branch.map(BranchFilter::as_param),
            base_url: ctx.base_url.clone(),
        });
        if self.failing.contains(&source) {
            return Err(VendorError::Rejected(format!("{source} offline")));
        }
        Ok(data.to_vec())
    }
}

/// Decrement a countdown, returning whether it was still positive.
fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl VendorApi for MockVendor {
    async fn visit_logs(
        &self,
        ctx: &ApiContext,
        _date: NaiveDate,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<VisitRecord>> {
        self.respond(ctx, Source::Visits, Some(branch), &self.visits)
    }

    async fn sale_orders(
        &self,
        ctx: &ApiContext,
        _range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<SaleOrder>> {
        if take_one(&self.sale_order_panics) {
            panic!("malformed sale order payload");
        }
        self.respond(ctx, Source::SaleOrders, Some(branch), &self.sale_orders)
    }

    async fn attendance_history(
        &self,
        ctx: &ApiContext,
        _range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<AttendanceRecord>> {
        self.respond(ctx, Source::Attendance, Some(branch), &self.attendance)
    }

    async fn deliveries(
        &self,
        ctx: &ApiContext,
        _range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<DeliveryRecord>> {
        self.respond(ctx, Source::Deliveries, Some(branch), &self.deliveries)
    }

    async fn trip_sheets(
        &self,
        ctx: &ApiContext,
        _range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<TripSheetRecord>> {
        self.respond(ctx, Source::TripSheets, Some(branch), &self.trip_sheets)
    }

    async fn receipts(
        &self,
        ctx: &ApiContext,
        _range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<Receipt>> {
        self.respond(ctx, Source::Receipts, Some(branch), &self.receipts)
    }

    async fn collection_receipts(
        &self,
        ctx: &ApiContext,
        _range: DateRange,
    ) -> VendorResult<Vec<CollectionReceipt>> {
        self.respond(ctx, Source::Collections, None, &self.collections)
    }

    async fn delivery_returns(
        &self,
        ctx: &ApiContext,
        _range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<DeliveryReturnRecord>> {
        self.respond(ctx, Source::DeliveryReturns, Some(branch), &self.delivery_returns)
    }

    async fn user_routes(
        &self,
        ctx: &ApiContext,
        _date: NaiveDate,
        user_id: &str,
    ) -> VendorResult<Vec<RouteRef>> {
        let routes = self.routes.get(user_id).cloned().unwrap_or_default();
        let result = self.respond(ctx, Source::Routes, None, &routes);
        if self.failing_route_users.contains(user_id) {
            return Err(VendorError::Status {
                status: 500,
                body: format!("routes for {user_id} unavailable"),
            });
        }
        result
    }

    async fn route_catalog(&self, _ctx: &ApiContext) -> VendorResult<Vec<RouteCatalogEntry>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.catalog_panics) {
            panic!("malformed route catalog");
        }
        if self.catalog_fails {
            return Err(VendorError::Rejected("catalog offline".to_string()));
        }
        Ok(self.catalog.clone())
    }
}
