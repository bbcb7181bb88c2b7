//! Pure derivations over fetched dashboard records.
//!
//! Nothing here performs I/O; every function reads already-settled source
//! data and produces a map or total for the summary. Maps are ordered so the
//! same inputs always serialize identically.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::attendance::{AttendanceRecord, VisitRecord};
use crate::models::delivery::DeliveryRecord;
use crate::models::receipt::{CollectionReceipt, Receipt};
use crate::models::sales::SaleOrder;

/// Presence flag for a user who checked in. `count` is always 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendancePresence {
    pub count: u32,
    pub user_id: Option<String>,
}

/// Kilometers travelled by one user, with the per-record readings behind it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KilometerTally {
    pub total_km: f64,
    pub details: Vec<KilometerDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KilometerDetail {
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
    pub date: Option<String>,
}

/// Orders taken by one sales person.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesTally {
    pub count: u32,
    pub total_value: f64,
}

/// Deliveries in a tracked status over all deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliveryRatio {
    pub tracked: usize,
    pub total: usize,
}

impl DeliveryRatio {
    /// Ratio as a fraction, `None` when there are no deliveries.
    pub fn fraction(&self) -> Option<f64> {
        (self.total > 0).then(|| self.tracked as f64 / self.total as f64)
    }
}

/// First attendance record per distinct user name, in first-seen order.
pub fn unique_attendance(records: &[AttendanceRecord]) -> Vec<AttendanceRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.user_name.as_str()))
        .cloned()
        .collect()
}

/// Presence map over the de-duplicated attendance set.
pub fn attendance_count(unique: &[AttendanceRecord]) -> BTreeMap<String, AttendancePresence> {
    unique
        .iter()
        .map(|r| {
            (
                r.user_name.clone(),
                AttendancePresence {
                    count: 1,
                    user_id: r.user_id.clone(),
                },
            )
        })
        .collect()
}

/// Kilometers per user over all attendance records, duplicates included.
pub fn kilometers_count(records: &[AttendanceRecord]) -> BTreeMap<String, KilometerTally> {
    let mut tallies: BTreeMap<String, KilometerTally> = BTreeMap::new();
    for record in records {
        let tally = tallies.entry(record.user_name.clone()).or_default();
        tally.total_km += record.travelled_km();
        tally.details.push(KilometerDetail {
            start_km: record.start_km,
            end_km: record.end_km,
            date: record.start_date.clone(),
        });
    }
    tallies
}

/// Visit count per entering user. Visits without a user are tallied under
/// the empty key so the counts still sum to the number of visits.
pub fn visit_count(visits: &[VisitRecord]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for visit in visits {
        let user = visit.entry_by.clone().unwrap_or_default();
        *counts.entry(user).or_insert(0) += 1;
    }
    counts
}

/// Order count and invoice total per sales person.
pub fn sale_count(orders: &[SaleOrder]) -> BTreeMap<String, SalesTally> {
    let mut tallies: BTreeMap<String, SalesTally> = BTreeMap::new();
    for order in orders {
        let tally = tallies.entry(order.sales_person_name.clone()).or_default();
        tally.count += 1;
        tally.total_value += order.invoice_value();
    }
    tallies
}

pub fn total_order_amount(orders: &[SaleOrder]) -> f64 {
    orders.iter().map(SaleOrder::invoice_value).sum()
}

pub fn total_products_sold(orders: &[SaleOrder]) -> f64 {
    orders.iter().map(SaleOrder::quantity).sum()
}

pub fn total_collection_amount(collections: &[CollectionReceipt]) -> f64 {
    collections
        .iter()
        .map(CollectionReceipt::collected_amount)
        .sum()
}

/// Scalar receipt total: sum of `credit_amount`.
pub fn receipt_total(receipts: &[Receipt]) -> f64 {
    receipts.iter().map(Receipt::credit).sum()
}

pub fn delivery_ratio(deliveries: &[DeliveryRecord]) -> DeliveryRatio {
    DeliveryRatio {
        tracked: deliveries.iter().filter(|d| d.status.is_tracked()).count(),
        total: deliveries.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::delivery::DeliveryStatus;
    use crate::models::sales::ProductLine;

    fn attendance(name: &str, start: Option<f64>, end: Option<f64>) -> AttendanceRecord {
        AttendanceRecord {
            user_id: Some(format!("id-{name}")),
            user_name: name.to_string(),
            start_km: start,
            end_km: end,
            start_date: Some("2024-05-01".to_string()),
            ..Default::default()
        }
    }

    fn order(person: &str, value: Option<f64>, qtys: &[f64]) -> SaleOrder {
        SaleOrder {
            sales_person_name: person.to_string(),
            total_invoice_value: value,
            products: qtys
                .iter()
                .map(|q| ProductLine {
                    total_qty: Some(*q),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn unique_attendance_keeps_first_seen_order() {
        let records = vec![
            attendance("B", Some(1.0), Some(2.0)),
            attendance("A", Some(10.0), Some(25.0)),
            attendance("B", Some(5.0), Some(9.0)),
            attendance("C", None, None),
            attendance("A", Some(25.0), Some(40.0)),
        ];
        let unique = unique_attendance(&records);
        let names: Vec<_> = unique.iter().map(|r| r.user_name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(unique[0].start_km, Some(1.0));
        assert_eq!(unique[1].end_km, Some(25.0));
    }

    #[test]
    fn duplicate_attendance_counts_once_but_sums_all_kilometers() {
        let records = vec![
            attendance("A", Some(10.0), Some(25.0)),
            attendance("A", Some(25.0), Some(40.0)),
        ];
        let unique = unique_attendance(&records);
        assert_eq!(unique.len(), 1);

        let presence = attendance_count(&unique);
        assert_eq!(presence.len(), 1);
        assert_eq!(presence["A"].count, 1);
        assert_eq!(presence["A"].user_id.as_deref(), Some("id-A"));

        let km = kilometers_count(&records);
        assert_eq!(km["A"].total_km, 30.0);
        assert_eq!(km["A"].details.len(), 2);
        assert_eq!(km["A"].details[1].start_km, Some(25.0));
    }

    #[test]
    fn missing_readings_add_detail_without_distance() {
        let records = vec![
            attendance("A", Some(10.0), None),
            attendance("A", None, Some(30.0)),
            attendance("A", Some(50.0), Some(45.0)),
            attendance("A", Some(100.0), Some(112.5)),
        ];
        let km = kilometers_count(&records);
        assert_eq!(km["A"].total_km, 12.5);
        assert_eq!(km["A"].details.len(), 4);
    }

    #[test]
    fn visit_count_tallies_per_user() {
        let visits: Vec<VisitRecord> = ["u1", "u2", "u1"]
            .iter()
            .map(|u| VisitRecord {
                entry_by: Some(u.to_string()),
                ..Default::default()
            })
            .chain(std::iter::once(VisitRecord::default()))
            .collect();
        let counts = visit_count(&visits);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["u1"], 2);
        assert_eq!(counts["u2"], 1);
        assert_eq!(counts[""], 1);
        assert_eq!(counts.values().sum::<u32>() as usize, visits.len());
    }

    #[test]
    fn single_order_totals() {
        let orders = vec![order("Meena", Some(500.0), &[3.0, 2.0])];
        assert_eq!(total_order_amount(&orders), 500.0);
        assert_eq!(total_products_sold(&orders), 5.0);
    }

    #[test]
    fn sale_count_groups_by_person() {
        let orders = vec![
            order("Meena", Some(500.0), &[3.0]),
            order("Arun", Some(120.0), &[1.0]),
            order("Meena", None, &[]),
            order("Meena", Some(80.5), &[2.0]),
        ];
        let counts = sale_count(&orders);
        assert_eq!(counts["Meena"].count, 3);
        assert_eq!(counts["Meena"].total_value, 580.5);
        assert_eq!(counts["Arun"].count, 1);
        assert_eq!(total_order_amount(&orders), 700.5);
        assert_eq!(total_products_sold(&orders), 6.0);
    }

    #[test]
    fn collection_and_receipt_totals() {
        let collections = vec![
            CollectionReceipt {
                total_amount: Some(100.0),
                ..Default::default()
            },
            CollectionReceipt {
                amount: Some(40.0),
                ..Default::default()
            },
        ];
        assert_eq!(total_collection_amount(&collections), 140.0);

        let receipts = vec![
            Receipt {
                credit_amount: Some(250.0),
                ..Default::default()
            },
            Receipt::default(),
        ];
        assert_eq!(receipt_total(&receipts), 250.0);
    }

    #[test]
    fn delivery_ratio_counts_untracked_in_denominator() {
        let deliveries: Vec<DeliveryRecord> = [
            DeliveryStatus::Delivered,
            DeliveryStatus::Pending,
            DeliveryStatus::Return,
            DeliveryStatus::Other("Cancelled".to_string()),
        ]
        .into_iter()
        .map(|status| DeliveryRecord {
            status,
            ..Default::default()
        })
        .collect();
        let ratio = delivery_ratio(&deliveries);
        assert_eq!(ratio, DeliveryRatio { tracked: 3, total: 4 });
        assert_eq!(ratio.fraction(), Some(0.75));
        assert_eq!(delivery_ratio(&[]).fraction(), None);
    }
}
