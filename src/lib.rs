pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use client::{HttpVendorClient, VendorApi, VendorError};
use services::cache::DashboardCache;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub dashboards: Arc<DashboardCache>,
}

impl AppState {
    /// State backed by the HTTP vendor client.
    pub fn new(config: config::AppConfig) -> Result<Self, VendorError> {
        let vendor = HttpVendorClient::new(config.vendor.timeout, config.vendor.endpoints.clone())?;
        Ok(Self::with_vendor(config, Arc::new(vendor)))
    }

    /// State backed by any `VendorApi` implementation.
    pub fn with_vendor(config: config::AppConfig, vendor: Arc<dyn VendorApi>) -> Self {
        let dashboards = Arc::new(DashboardCache::new(
            vendor,
            config.vendor.clone(),
            config.dashboard.clone(),
        ));
        Self { config, dashboards }
    }
}
