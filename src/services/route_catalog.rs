//! Cached route catalog, one per backend and company.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::client::{ApiContext, VendorApi};
use crate::models::route::RouteCatalog;

#[derive(Debug, Clone)]
struct CachedCatalog {
    fetched_at: Instant,
    catalog: Arc<RouteCatalog>,
}

/// Route catalog cache keyed by base URL and company.
#[derive(Debug)]
pub struct RouteCatalogCache {
    ttl: Duration,
    entries: DashMap<String, CachedCatalog>,
}

impl RouteCatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Catalog for the context's company, refetched once older than the TTL.
    ///
    /// A failed refetch keeps serving the previous catalog; with nothing
    /// cached an empty catalog is returned so routes fall back to raw names.
    pub async fn get(&self, vendor: &dyn VendorApi, ctx: &ApiContext) -> Arc<RouteCatalog> {
        let key = format!("{}|{}", ctx.base_url, ctx.company_id);
        let cached = self.entries.get(&key).map(|entry| entry.value().clone());

        if let Some(entry) = &cached {
            if entry.fetched_at.elapsed() < self.ttl {
                return Arc::clone(&entry.catalog);
            }
        }

        match vendor.route_catalog(ctx).await {
            Ok(entries) => {
                let catalog = Arc::new(RouteCatalog::new(entries));
                tracing::debug!(routes = catalog.len(), company_id = %ctx.company_id, "Route catalog refreshed");
                self.entries.insert(
                    key,
                    CachedCatalog {
                        fetched_at: Instant::now(),
                        catalog: Arc::clone(&catalog),
                    },
                );
                catalog
            }
            Err(err) => {
                tracing::warn!(error = %err, company_id = %ctx.company_id, "Route catalog unavailable");
                cached.map(|entry| entry.catalog).unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockVendor;
    use crate::models::route::{RouteCatalogEntry, RouteRef};

    fn ctx() -> ApiContext {
        ApiContext {
            base_url: "https://erp.example".to_string(),
            token: None,
            company_id: "1".to_string(),
            user_type_id: "3".to_string(),
        }
    }

    fn vendor() -> MockVendor {
        MockVendor {
            catalog: vec![RouteCatalogEntry {
                route_id: "7".to_string(),
                route_name: "Market Road".to_string(),
            }],
            ..Default::default()
        }
    }

    fn route_7() -> RouteRef {
        RouteRef {
            route_id: "7".to_string(),
            route_name: None,
        }
    }

    #[tokio::test]
    async fn fresh_catalog_is_reused() {
        let vendor = vendor();
        let cache = RouteCatalogCache::new(Duration::from_secs(60));
        cache.get(&vendor, &ctx()).await;
        let catalog = cache.get(&vendor, &ctx()).await;
        assert_eq!(vendor.catalog_call_count(), 1);
        assert_eq!(catalog.resolve(&route_7()).route_name, "Market Road");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn expired_catalog_is_refetched() {
        let vendor = vendor();
        let cache = RouteCatalogCache::new(Duration::ZERO);
        cache.get(&vendor, &ctx()).await;
        cache.get(&vendor, &ctx()).await;
        assert_eq!(vendor.catalog_call_count(), 2);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_stale_catalog() {
        let mut vendor = vendor();
        let cache = RouteCatalogCache::new(Duration::ZERO);
        cache.get(&vendor, &ctx()).await;

        vendor.catalog_fails = true;
        let catalog = cache.get(&vendor, &ctx()).await;
        assert_eq!(catalog.resolve(&route_7()).route_name, "Market Road");
    }

    #[tokio::test]
    async fn failure_without_cache_is_empty() {
        let mut vendor = vendor();
        vendor.catalog_fails = true;
        let cache = RouteCatalogCache::new(Duration::from_secs(60));
        let catalog = cache.get(&vendor, &ctx()).await;
        assert!(catalog.is_empty());
        assert!(cache.is_empty());
    }
}
