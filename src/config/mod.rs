use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::client::endpoints::ProvisionalEndpoints;
use crate::client::ApiContext;
use crate::errors::AggregationError;
use crate::models::query::DashboardQuery;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub vendor: VendorConfig,
    pub dashboard: DashboardConfig,
}

/// Where and how to reach the vendor backend.
#[derive(Debug, Clone)]
pub struct VendorConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    /// Per-company base URL overrides, keyed by company id.
    pub company_base_urls: HashMap<String, String>,
    pub timeout: Duration,
    pub endpoints: ProvisionalEndpoints,
}

/// Caching, refresh, and retry policy for dashboard aggregations.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub stale_after: Duration,
    pub refresh_interval: Duration,
    pub watch_window: Duration,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub route_catalog_ttl: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(30),
            refresh_interval: Duration::from_secs(90),
            watch_window: Duration::from_secs(300),
            retry_count: 2,
            retry_delay: Duration::from_millis(1000),
            route_catalog_ttl: Duration::from_secs(600),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = DashboardConfig::default();
        let provisional = ProvisionalEndpoints::default();

        Ok(Self {
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            vendor: VendorConfig {
                base_url: env::var("VENDOR_BASE_URL")?,
                api_token: env::var("VENDOR_API_TOKEN").ok().filter(|t| !t.is_empty()),
                company_base_urls: parse_company_urls(
                    &env::var("VENDOR_COMPANY_BASE_URLS").unwrap_or_default(),
                ),
                timeout: Duration::from_secs(env_u64("VENDOR_TIMEOUT_SECS", 30)),
                endpoints: ProvisionalEndpoints {
                    delivery_returns: env::var("VENDOR_DELIVERY_RETURN_PATH")
                        .unwrap_or(provisional.delivery_returns),
                    route_catalog: env::var("VENDOR_ROUTE_CATALOG_PATH")
                        .unwrap_or(provisional.route_catalog),
                },
            },
            dashboard: DashboardConfig {
                stale_after: Duration::from_secs(env_u64(
                    "DASHBOARD_STALE_SECS",
                    defaults.stale_after.as_secs(),
                )),
                refresh_interval: Duration::from_secs(env_u64(
                    "DASHBOARD_REFRESH_SECS",
                    defaults.refresh_interval.as_secs(),
                )),
                watch_window: Duration::from_secs(env_u64(
                    "DASHBOARD_WATCH_SECS",
                    defaults.watch_window.as_secs(),
                )),
                retry_count: env::var("DASHBOARD_RETRY_COUNT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.retry_count),
                retry_delay: Duration::from_millis(env_u64(
                    "DASHBOARD_RETRY_DELAY_MS",
                    defaults.retry_delay.as_millis() as u64,
                )),
                route_catalog_ttl: Duration::from_secs(env_u64(
                    "ROUTE_CATALOG_TTL_SECS",
                    defaults.route_catalog_ttl.as_secs(),
                )),
            },
        })
    }
}

impl VendorConfig {
    /// Base URL for a company, falling back to the default backend.
    pub fn base_url_for(&self, company_id: &str) -> &str {
        self.company_base_urls
            .get(company_id)
            .map(String::as_str)
            .unwrap_or(&self.base_url)
    }

    /// Build the call context for a query. Both company and user type are required.
    pub fn context_for(&self, query: &DashboardQuery) -> Result<ApiContext, AggregationError> {
        let company_id = query
            .company_id
            .clone()
            .ok_or(AggregationError::MissingContext("company_id"))?;
        let user_type_id = query
            .user_type_id
            .clone()
            .ok_or(AggregationError::MissingContext("user_type_id"))?;

        Ok(ApiContext {
            base_url: self.base_url_for(&company_id).to_string(),
            token: self.api_token.clone(),
            company_id,
            user_type_id,
        })
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse `"1=https://a.example;2=https://b.example"` into a company → URL map.
/// Malformed pairs are skipped.
fn parse_company_urls(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let (company, url) = pair.split_once('=')?;
            let (company, url) = (company.trim(), url.trim());
            if company.is_empty() || url.is_empty() {
                tracing::warn!(entry = %pair, "Ignoring malformed company base URL entry");
                return None;
            }
            Some((company.to_string(), url.to_string()))
        })
        .collect()
}
