//! Keyed dashboard cache with a staleness window, per-key single flight,
//! and outer retry around each aggregation.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::client::VendorApi;
use crate::config::{DashboardConfig, VendorConfig};
use crate::errors::AggregationError;
use crate::models::query::DashboardQuery;
use crate::services::dashboard::{self, DashboardSummary};
use crate::services::route_catalog::RouteCatalogCache;

#[derive(Debug, Default)]
struct Slot {
    summary: Option<Arc<DashboardSummary>>,
    fetched_at: Option<Instant>,
    last_requested: Option<Instant>,
}

/// Counts from one background refresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshReport {
    pub refreshed: usize,
    pub evicted: usize,
}

/// Dashboard summaries keyed by query.
///
/// Each key has its own async mutex, so two requests for the same key never
/// aggregate concurrently: the second waits and reuses the fresh result.
pub struct DashboardCache {
    vendor: Arc<dyn VendorApi>,
    vendor_config: VendorConfig,
    policy: DashboardConfig,
    catalog: Arc<RouteCatalogCache>,
    slots: DashMap<DashboardQuery, Arc<Mutex<Slot>>>,
}

impl DashboardCache {
    pub fn new(
        vendor: Arc<dyn VendorApi>,
        vendor_config: VendorConfig,
        policy: DashboardConfig,
    ) -> Self {
        let catalog = Arc::new(RouteCatalogCache::new(policy.route_catalog_ttl));
        Self {
            vendor,
            vendor_config,
            policy,
            catalog,
            slots: DashMap::new(),
        }
    }

    /// Number of cached dashboard keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of cached route catalogs.
    pub fn route_catalogs(&self) -> usize {
        self.catalog.len()
    }

    /// Summary for a query: cached when fresh, otherwise re-aggregated.
    /// `force` bypasses the staleness window (manual refresh).
    pub async fn get(&self, query: &DashboardQuery, force: bool) -> Arc<DashboardSummary> {
        let slot = self.slot(query);
        let mut slot = slot.lock().await;
        slot.last_requested = Some(Instant::now());

        if !force {
            if let (Some(summary), Some(fetched_at)) = (&slot.summary, slot.fetched_at) {
                if fetched_at.elapsed() < self.policy.stale_after {
                    tracing::debug!(date = %query.date, "Dashboard cache hit");
                    return Arc::clone(summary);
                }
            }
        }

        let summary = Arc::new(self.aggregate_with_retry(query).await);
        slot.summary = Some(Arc::clone(&summary));
        slot.fetched_at = Some(Instant::now());
        summary
    }

    /// Re-aggregate every key requested within the watch window and drop
    /// the keys that went idle.
    pub async fn refresh_watched(&self) -> RefreshReport {
        let started = Instant::now();
        let slots: Vec<(DashboardQuery, Arc<Mutex<Slot>>)> = self
            .slots
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut report = RefreshReport::default();
        for (query, slot) in slots {
            let mut slot = slot.lock().await;
            let idle = slot.last_requested.map_or(true, |at| {
                started.saturating_duration_since(at) > self.policy.watch_window
            });

            if idle {
                drop(slot);
                self.slots.remove(&query);
                report.evicted += 1;
                continue;
            }

            let summary = self.aggregate_with_retry(&query).await;
            slot.summary = Some(Arc::new(summary));
            slot.fetched_at = Some(Instant::now());
            report.refreshed += 1;
        }
        report
    }

    fn slot(&self, query: &DashboardQuery) -> Arc<Mutex<Slot>> {
        Arc::clone(self.slots.entry(query.clone()).or_default().value())
    }

    /// Run the aggregation, retrying when the run itself failed or when
    /// every source was unavailable.
    async fn aggregate_with_retry(&self, query: &DashboardQuery) -> DashboardSummary {
        let attempts = self.policy.retry_count + 1;
        let mut degraded = None;

        for attempt in 1..=attempts {
            match self.run_once(query).await {
                Ok(summary) if !summary.all_sources_unavailable() => return summary,
                Ok(summary) => {
                    tracing::warn!(attempt, attempts, "Every dashboard source unavailable");
                    degraded = Some(summary);
                }
                Err(err) => {
                    tracing::error!(attempt, attempts, error = %err, "Dashboard aggregation failed");
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.policy.retry_delay).await;
            }
        }

        degraded.unwrap_or_default()
    }

    /// One aggregation on its own task. Source fetches contain their own
    /// panics; anything else that panics is reported as a failure.
    async fn run_once(&self, query: &DashboardQuery) -> Result<DashboardSummary, AggregationError> {
        let vendor = Arc::clone(&self.vendor);
        let catalog = Arc::clone(&self.catalog);
        let settings = self.vendor_config.clone();
        let query = query.clone();

        tokio::spawn(async move {
            dashboard::aggregate(vendor.as_ref(), &catalog, &settings, &query).await
        })
        .await
        .map_err(|err| AggregationError::Failure(err.to_string()))
    }
}
