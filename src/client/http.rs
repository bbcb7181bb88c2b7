//! reqwest-backed implementation of `VendorApi`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::endpoints::{self, ProvisionalEndpoints};
use super::{snippet, ApiContext, VendorApi, VendorEnvelope, VendorError, VendorResult};
use crate::models::attendance::{AttendanceRecord, VisitRecord};
use crate::models::branch::BranchFilter;
use crate::models::delivery::{DeliveryRecord, DeliveryReturnRecord, TripSheetRecord};
use crate::models::query::DateRange;
use crate::models::receipt::{CollectionReceipt, Receipt};
use crate::models::route::{RouteCatalogEntry, RouteRef};
use crate::models::sales::SaleOrder;

/// HTTP client for the vendor backend.
#[derive(Debug, Clone)]
pub struct HttpVendorClient {
    client: Client,
    endpoints: ProvisionalEndpoints,
}

impl HttpVendorClient {
    /// Build a client with a per-request transport timeout.
    pub fn new(timeout: Duration, endpoints: ProvisionalEndpoints) -> Result<Self, VendorError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }

    /// GET a list endpoint and unwrap the vendor envelope.
    async fn get_list<T>(
        &self,
        ctx: &ApiContext,
        path: &str,
        query: &[(&str, String)],
    ) -> VendorResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!(
            "{}/{}",
            ctx.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &ctx.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(%url, "Vendor request");
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = snippet(&response.text().await.unwrap_or_default());
            tracing::debug!(%url, status = status.as_u16(), %body, "Vendor error response");
            return Err(VendorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: VendorEnvelope<Vec<T>> = serde_json::from_slice(&bytes)?;
        envelope.into_data()
    }
}

fn range_params(range: DateRange, branch: &BranchFilter) -> Vec<(&'static str, String)> {
    vec![
        ("Fromdate", range.from.to_string()),
        ("Todate", range.to.to_string()),
        ("Branch_Id", branch.as_param()),
    ]
}

#[async_trait]
impl VendorApi for HttpVendorClient {
    async fn visit_logs(
        &self,
        ctx: &ApiContext,
        date: NaiveDate,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<VisitRecord>> {
        let query = [
            ("reqDate", date.to_string()),
            ("UserId", String::new()),
            ("Branch_Id", branch.as_param()),
        ];
        self.get_list(ctx, endpoints::VISIT_LOGS, &query).await
    }

    async fn sale_orders(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<SaleOrder>> {
        // Empty Created_by / Sales_Person_Id means every user.
        let query = [
            ("Fromdate", range.from.to_string()),
            ("Todate", range.to.to_string()),
            ("Company_Id", ctx.company_id.clone()),
            ("Branch_Id", branch.as_param()),
            ("Created_by", String::new()),
            ("Sales_Person_Id", String::new()),
        ];
        self.get_list(ctx, endpoints::SALE_ORDERS, &query).await
    }

    async fn attendance_history(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<AttendanceRecord>> {
        let query = [
            ("From", range.from.to_string()),
            ("To", range.to.to_string()),
            ("UserTypeID", ctx.user_type_id.clone()),
            ("Branch_Id", branch.as_param()),
        ];
        self.get_list(ctx, endpoints::ATTENDANCE_HISTORY, &query).await
    }

    async fn deliveries(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<DeliveryRecord>> {
        self.get_list(ctx, endpoints::DELIVERY_ORDERS, &range_params(range, branch))
            .await
    }

    async fn trip_sheets(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<TripSheetRecord>> {
        self.get_list(ctx, endpoints::DELIVERY_TRIP_SHEETS, &range_params(range, branch))
            .await
    }

    async fn receipts(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<Receipt>> {
        self.get_list(ctx, endpoints::RECEIPT_MASTER, &range_params(range, branch))
            .await
    }

    async fn collection_receipts(
        &self,
        ctx: &ApiContext,
        range: DateRange,
    ) -> VendorResult<Vec<CollectionReceipt>> {
        let query = [
            ("Fromdate", range.from.to_string()),
            ("Todate", range.to.to_string()),
        ];
        self.get_list(ctx, endpoints::COLLECTION_RECEIPTS, &query).await
    }

    async fn delivery_returns(
        &self,
        ctx: &ApiContext,
        range: DateRange,
        branch: &BranchFilter,
    ) -> VendorResult<Vec<DeliveryReturnRecord>> {
        self.get_list(
            ctx,
            &self.endpoints.delivery_returns,
            &range_params(range, branch),
        )
        .await
    }

    async fn user_routes(
        &self,
        ctx: &ApiContext,
        date: NaiveDate,
        user_id: &str,
    ) -> VendorResult<Vec<RouteRef>> {
        let query = [("date", date.to_string()), ("User_Id", user_id.to_string())];
        self.get_list(ctx, endpoints::USER_ROUTES, &query).await
    }

    async fn route_catalog(&self, ctx: &ApiContext) -> VendorResult<Vec<RouteCatalogEntry>> {
        let query = [("Company_id", ctx.company_id.clone())];
        self.get_list(ctx, &self.endpoints.route_catalog, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_params_carry_branch_filter() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let params = range_params(DateRange::day(date), &BranchFilter::Many(vec![1, 2, 3]));
        assert_eq!(params[0], ("Fromdate", "2024-05-01".to_string()));
        assert_eq!(params[1], ("Todate", "2024-05-01".to_string()));
        assert_eq!(params[2], ("Branch_Id", "1,2,3".to_string()));
    }

    #[test]
    fn range_params_all_branches_is_blank() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let params = range_params(DateRange::day(date), &BranchFilter::All);
        assert_eq!(params[2], ("Branch_Id", String::new()));
    }
}
