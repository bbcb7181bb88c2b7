//! Per-user report rows and CSV rendering of a dashboard summary.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::services::dashboard::DashboardSummary;

/// One row per named user seen in attendance, visits, or sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRow {
    pub user_name: String,
    pub user_id: String,
    pub present: bool,
    pub total_km: f64,
    pub visits: u32,
    pub orders: u32,
    pub order_value: f64,
    pub routes: String,
}

/// Merge the per-user maps of a summary into rows sorted by user name.
pub fn user_rows(summary: &DashboardSummary) -> Vec<UserRow> {
    let names: BTreeSet<&String> = summary
        .attendance_count
        .keys()
        .chain(summary.kilometers_count.keys())
        .chain(summary.visit_count.keys())
        .chain(summary.sale_count.keys())
        .filter(|name| !name.is_empty())
        .collect();

    names
        .into_iter()
        .map(|name| {
            let presence = summary.attendance_count.get(name);
            let sales = summary.sale_count.get(name);
            let routes = summary
                .route_assignments
                .iter()
                .find(|a| &a.user_name == name)
                .map(|a| {
                    a.routes
                        .iter()
                        .map(|r| r.route_name.as_str())
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .unwrap_or_default();

            UserRow {
                user_name: name.clone(),
                user_id: presence
                    .and_then(|p| p.user_id.clone())
                    .unwrap_or_default(),
                present: presence.is_some(),
                total_km: summary
                    .kilometers_count
                    .get(name)
                    .map_or(0.0, |k| k.total_km),
                visits: summary.visit_count.get(name).copied().unwrap_or(0),
                orders: sales.map_or(0, |s| s.count),
                order_value: sales.map_or(0.0, |s| s.total_value),
                routes,
            }
        })
        .collect()
}

/// Render rows as CSV with a header line.
pub fn to_csv(rows: &[UserRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}
