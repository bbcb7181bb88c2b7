//! Background refresh of dashboards that clients are still watching.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::services::cache::DashboardCache;

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Spawn the refresh loop. Passes run one after another, never overlapping;
/// a pass that overruns the interval skips the missed ticks.
///
/// The loop exits when `shutdown` flips to `true` or its sender is dropped.
pub fn spawn(
    cache: Arc<DashboardCache>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let period = interval.max(MIN_INTERVAL);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; nothing is cached yet.
        ticker.tick().await;

        tracing::info!(interval_secs = period.as_secs_f64(), "Dashboard refresher started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = cache.refresh_watched().await;
                    if report.refreshed > 0 || report.evicted > 0 {
                        tracing::debug!(
                            refreshed = report.refreshed,
                            evicted = report.evicted,
                            "Dashboard refresh pass"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("Dashboard refresher stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::client::endpoints::ProvisionalEndpoints;
    use crate::client::mock::MockVendor;
    use crate::config::{DashboardConfig, VendorConfig};
    use crate::models::branch::BranchSelection;
    use crate::models::query::DashboardQuery;
    use crate::services::dashboard::Source;

    fn cache(vendor: Arc<MockVendor>) -> Arc<DashboardCache> {
        Arc::new(DashboardCache::new(
            vendor,
            VendorConfig {
                base_url: "https://erp.example".to_string(),
                api_token: None,
                company_base_urls: HashMap::new(),
                timeout: Duration::from_secs(5),
                endpoints: ProvisionalEndpoints::default(),
            },
            DashboardConfig {
                stale_after: Duration::from_secs(60),
                retry_delay: Duration::ZERO,
                ..Default::default()
            },
        ))
    }

    fn query() -> DashboardQuery {
        DashboardQuery::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            Some("1".to_string()),
            Some("3".to_string()),
            BranchSelection::default(),
        )
    }

    #[tokio::test]
    async fn refreshes_watched_keys_until_shutdown() {
        let vendor = Arc::new(MockVendor::default());
        let cache = cache(vendor.clone());
        cache.get(&query(), false).await;

        let (tx, rx) = watch::channel(false);
        let handle = spawn(cache.clone(), Duration::from_millis(20), rx);

        tokio::time::sleep(Duration::from_millis(120)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        let calls = vendor.calls_for(Source::SaleOrders).len();
        assert!(calls >= 2, "expected background refreshes, saw {calls} calls");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn stops_when_sender_dropped() {
        let vendor = Arc::new(MockVendor::default());
        let (tx, rx) = watch::channel(false);
        let handle = spawn(cache(vendor), Duration::from_secs(3600), rx);
        drop(tx);
        handle.await.unwrap();
    }
}
