//! Dashboard aggregation: fan out to every vendor source, settle each one
//! independently, then derive per-user and aggregate statistics.

use std::collections::BTreeMap;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use chrono::NaiveDate;
use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::client::{ApiContext, VendorApi, VendorResult};
use crate::config::VendorConfig;
use crate::errors::AggregationError;
use crate::models::attendance::{AttendanceRecord, VisitRecord};
use crate::models::delivery::{DeliveryRecord, DeliveryReturnRecord, TripSheetRecord};
use crate::models::query::{DashboardQuery, DateRange};
use crate::models::receipt::CollectionReceipt;
use crate::models::route::{RouteAssignment, RouteRef};
use crate::models::sales::SaleOrder;
use crate::services::route_catalog::RouteCatalogCache;
use crate::services::stats::{
    self, AttendancePresence, DeliveryRatio, KilometerTally, SalesTally,
};

/// A data source feeding the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Visits,
    SaleOrders,
    Attendance,
    Deliveries,
    TripSheets,
    Receipts,
    Collections,
    DeliveryReturns,
    Routes,
}

impl Source {
    /// Sources fetched directly in the fan-out phase.
    pub const FETCHED: [Source; 8] = [
        Source::Visits,
        Source::SaleOrders,
        Source::Attendance,
        Source::Deliveries,
        Source::TripSheets,
        Source::Receipts,
        Source::Collections,
        Source::DeliveryReturns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Visits => "visits",
            Source::SaleOrders => "sale_orders",
            Source::Attendance => "attendance",
            Source::Deliveries => "deliveries",
            Source::TripSheets => "trip_sheets",
            Source::Receipts => "receipts",
            Source::Collections => "collections",
            Source::DeliveryReturns => "delivery_returns",
            Source::Routes => "routes",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one source for a single aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Ok { records: usize },
    /// Some lookups of a per-user source failed.
    Partial { records: usize, failed: usize },
    Unavailable { reason: String },
}

impl SourceStatus {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Consolidated dashboard for one date and branch selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardSummary {
    pub date: Option<NaiveDate>,
    pub attendance: Vec<AttendanceRecord>,
    pub unique_attendance: Vec<AttendanceRecord>,
    pub visits: Vec<VisitRecord>,
    pub sale_orders: Vec<SaleOrder>,
    pub deliveries: Vec<DeliveryRecord>,
    pub trip_sheets: Vec<TripSheetRecord>,
    pub collections: Vec<CollectionReceipt>,
    pub delivery_returns: Vec<DeliveryReturnRecord>,
    pub route_assignments: Vec<RouteAssignment>,
    pub attendance_count: BTreeMap<String, AttendancePresence>,
    pub kilometers_count: BTreeMap<String, KilometerTally>,
    pub visit_count: BTreeMap<String, u32>,
    pub sale_count: BTreeMap<String, SalesTally>,
    pub receipt_total: f64,
    pub total_order_amount: f64,
    pub total_products_sold: f64,
    pub total_collection_amount: f64,
    pub delivery_ratio: DeliveryRatio,
    pub sources: BTreeMap<Source, SourceStatus>,
}

impl DashboardSummary {
    /// True when every fan-out source failed, i.e. the backend looked down.
    pub fn all_sources_unavailable(&self) -> bool {
        Source::FETCHED.iter().all(|source| {
            self.sources
                .get(source)
                .is_some_and(SourceStatus::is_unavailable)
        })
    }
}

/// Aggregate the dashboard for a query.
///
/// Returns the empty summary without any vendor call when the query lacks a
/// company or user type. Individual source failures never fail the
/// aggregation; they fall back to empty data and are reported in `sources`.
pub async fn aggregate(
    vendor: &dyn VendorApi,
    catalog: &RouteCatalogCache,
    settings: &VendorConfig,
    query: &DashboardQuery,
) -> DashboardSummary {
    let ctx = match settings.context_for(query) {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::debug!(error = %err, "Skipping dashboard aggregation");
            return DashboardSummary::default();
        }
    };

    let run_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "aggregate",
        %run_id,
        date = %query.date,
        company_id = %ctx.company_id
    );
    collect(vendor, catalog, &ctx, query).instrument(span).await
}

async fn collect(
    vendor: &dyn VendorApi,
    catalog: &RouteCatalogCache,
    ctx: &ApiContext,
    query: &DashboardQuery,
) -> DashboardSummary {
    let branch = query.branches.resolve();
    let range = DateRange::day(query.date);

    let (
        (visits, visits_status),
        (sale_orders, sale_orders_status),
        (attendance, attendance_status),
        (deliveries, deliveries_status),
        (trip_sheets, trip_sheets_status),
        (receipts, receipts_status),
        (collections, collections_status),
        (delivery_returns, delivery_returns_status),
    ) = tokio::join!(
        settle(Source::Visits, vendor.visit_logs(ctx, query.date, &branch)),
        settle(Source::SaleOrders, vendor.sale_orders(ctx, range, &branch)),
        settle(
            Source::Attendance,
            vendor.attendance_history(ctx, range, &branch)
        ),
        settle(Source::Deliveries, vendor.deliveries(ctx, range, &branch)),
        settle(Source::TripSheets, vendor.trip_sheets(ctx, range, &branch)),
        settle(Source::Receipts, vendor.receipts(ctx, range, &branch)),
        settle(Source::Collections, vendor.collection_receipts(ctx, range)),
        settle(
            Source::DeliveryReturns,
            vendor.delivery_returns(ctx, range, &branch)
        ),
    );

    let unique_attendance = stats::unique_attendance(&attendance);
    let (route_assignments, routes_status) =
        resolve_routes(vendor, catalog, ctx, query.date, &unique_attendance).await;

    let sources = BTreeMap::from([
        (Source::Visits, visits_status),
        (Source::SaleOrders, sale_orders_status),
        (Source::Attendance, attendance_status),
        (Source::Deliveries, deliveries_status),
        (Source::TripSheets, trip_sheets_status),
        (Source::Receipts, receipts_status),
        (Source::Collections, collections_status),
        (Source::DeliveryReturns, delivery_returns_status),
        (Source::Routes, routes_status),
    ]);

    let summary = DashboardSummary {
        date: Some(query.date),
        attendance_count: stats::attendance_count(&unique_attendance),
        kilometers_count: stats::kilometers_count(&attendance),
        visit_count: stats::visit_count(&visits),
        sale_count: stats::sale_count(&sale_orders),
        receipt_total: stats::receipt_total(&receipts),
        total_order_amount: stats::total_order_amount(&sale_orders),
        total_products_sold: stats::total_products_sold(&sale_orders),
        total_collection_amount: stats::total_collection_amount(&collections),
        delivery_ratio: stats::delivery_ratio(&deliveries),
        attendance,
        unique_attendance,
        visits,
        sale_orders,
        deliveries,
        trip_sheets,
        collections,
        delivery_returns,
        route_assignments,
        sources,
    };

    tracing::info!(
        attendance = summary.unique_attendance.len(),
        orders = summary.sale_orders.len(),
        deliveries = summary.deliveries.len(),
        unavailable = summary
            .sources
            .values()
            .filter(|s| s.is_unavailable())
            .count(),
        "Dashboard aggregated"
    );
    summary
}

/// Await one source, substituting an empty list when it fails or panics.
async fn settle<T, F>(source: Source, fetch: F) -> (Vec<T>, SourceStatus)
where
    F: Future<Output = VendorResult<Vec<T>>>,
{
    let reason = match AssertUnwindSafe(fetch).catch_unwind().await {
        Ok(Ok(records)) => {
            let status = SourceStatus::Ok {
                records: records.len(),
            };
            return (records, status);
        }
        Ok(Err(err)) => err.to_string(),
        Err(panic) => format!("fetch panicked: {}", panic_message(panic.as_ref())),
    };

    let err = AggregationError::SourceUnavailable {
        origin: source,
        reason: reason.clone(),
    };
    tracing::warn!(error = %err, "Dashboard source unavailable; using empty default");
    (Vec::new(), SourceStatus::Unavailable { reason })
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Look up route assignments for every attendance user in parallel and name
/// them from the route catalog.
async fn resolve_routes(
    vendor: &dyn VendorApi,
    catalog: &RouteCatalogCache,
    ctx: &ApiContext,
    date: NaiveDate,
    users: &[AttendanceRecord],
) -> (Vec<RouteAssignment>, SourceStatus) {
    if users.is_empty() {
        return (Vec::new(), SourceStatus::Ok { records: 0 });
    }

    let lookups = users
        .iter()
        .map(|user| fetch_user_routes(vendor, ctx, date, user));
    let (catalog, lookups) = tokio::join!(catalog.get(vendor, ctx), join_all(lookups));

    let mut failed = 0;
    let mut records = 0;
    let assignments = users
        .iter()
        .zip(lookups)
        .map(|(user, lookup)| {
            let refs = lookup.unwrap_or_else(|| {
                failed += 1;
                Vec::new()
            });
            records += refs.len();
            RouteAssignment {
                user_id: user.user_id.clone(),
                user_name: user.user_name.clone(),
                routes: refs.iter().map(|r| catalog.resolve(r)).collect(),
            }
        })
        .collect();

    let status = if failed == 0 {
        SourceStatus::Ok { records }
    } else if failed == users.len() {
        SourceStatus::Unavailable {
            reason: format!("route lookup failed for all {failed} users"),
        }
    } else {
        SourceStatus::Partial { records, failed }
    };
    (assignments, status)
}

/// Route refs for one user; `None` when the lookup failed.
async fn fetch_user_routes(
    vendor: &dyn VendorApi,
    ctx: &ApiContext,
    date: NaiveDate,
    user: &AttendanceRecord,
) -> Option<Vec<RouteRef>> {
    let Some(user_id) = user.user_id.as_deref() else {
        return Some(Vec::new());
    };
    match AssertUnwindSafe(vendor.user_routes(ctx, date, user_id))
        .catch_unwind()
        .await
    {
        Ok(Ok(routes)) => Some(routes),
        Ok(Err(err)) => {
            tracing::warn!(user_id, error = %err, "Route lookup failed; defaulting to no routes");
            None
        }
        Err(panic) => {
            tracing::error!(user_id, panic = panic_message(panic.as_ref()), "Route lookup panicked");
            None
        }
    }
}
