//! Dashboard routes: consolidated field-sales summary and per-user export.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::models::branch::BranchSelection;
use crate::models::query::DashboardQuery;
use crate::services::dashboard::DashboardSummary;
use crate::services::export;
use crate::AppState;

/// Query parameters shared by the dashboard endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    pub company_id: Option<String>,
    pub user_type_id: Option<String>,
    /// Comma-separated branch ids.
    pub branches: Option<String>,
    /// Bypass the cache and re-aggregate now.
    #[serde(default)]
    pub refresh: bool,
}

impl DashboardParams {
    /// Validate parameters into a cache key plus the force-refresh flag.
    pub fn into_query(self) -> Result<(DashboardQuery, bool), AppError> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => chrono::Local::now().date_naive(),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::Validation(format!("date must be YYYY-MM-DD, got {raw}")))?,
        };
        let branches = self
            .branches
            .as_deref()
            .unwrap_or_default()
            .parse::<BranchSelection>()
            .map_err(AppError::Validation)?;

        let query = DashboardQuery::new(date, self.company_id, self.user_type_id, branches);
        Ok((query, self.refresh))
    }
}

/// GET /api/v1/dashboard/summary: consolidated dashboard for a day.
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<ApiResponse<DashboardSummary>>, AppError> {
    let (query, force) = params.into_query()?;
    let summary = state.dashboards.get(&query, force).await;
    Ok(ApiResponse::success(summary.as_ref().clone()))
}

/// GET /api/v1/dashboard/users.csv: per-user report as CSV.
pub async fn users_csv(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let (query, force) = params.into_query()?;
    let summary = state.dashboards.get(&query, force).await;
    let body = export::to_csv(&export::user_rows(&summary))
        .map_err(|e| AppError::Internal(format!("CSV export failed: {e}")))?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}
