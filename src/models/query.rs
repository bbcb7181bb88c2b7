//! Dashboard query: the key an aggregation is computed and cached under.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::branch::BranchSelection;

/// Inputs of one dashboard aggregation.
///
/// `company_id` and `user_type_id` come from the caller's session; when either
/// is missing the aggregation short-circuits to an empty summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub date: NaiveDate,
    pub company_id: Option<String>,
    pub user_type_id: Option<String>,
    pub branches: BranchSelection,
}

impl DashboardQuery {
    pub fn new(
        date: NaiveDate,
        company_id: Option<String>,
        user_type_id: Option<String>,
        branches: BranchSelection,
    ) -> Self {
        Self {
            date,
            company_id: non_blank(company_id),
            user_type_id: non_blank(user_type_id),
            branches,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Inclusive date range sent as `Fromdate`/`Todate` (or `From`/`To`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// The single-day range `[date, date]`.
    pub fn day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }
}
