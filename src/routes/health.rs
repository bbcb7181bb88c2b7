//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub vendor_base_url: String,
    pub cached_dashboards: usize,
    pub cached_route_catalogs: usize,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: reports the configured backend and cache occupancy.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        vendor_base_url: state.config.vendor.base_url.clone(),
        cached_dashboards: state.dashboards.len(),
        cached_route_catalogs: state.dashboards.route_catalogs(),
    })
}
