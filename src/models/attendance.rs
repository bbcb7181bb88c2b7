//! Attendance and visit-log records as returned by the vendor backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

/// One attendance entry: a user's check-in for the day with odometer readings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "UserId", default, deserialize_with = "de::opt_id")]
    pub user_id: Option<String>,
    #[serde(rename = "User_Name", default, deserialize_with = "de::string_or_empty")]
    pub user_name: String,
    #[serde(rename = "Start_KM", default, deserialize_with = "de::opt_f64")]
    pub start_km: Option<f64>,
    #[serde(rename = "End_KM", default, deserialize_with = "de::opt_f64")]
    pub end_km: Option<f64>,
    #[serde(rename = "Start_Date", default, deserialize_with = "de::opt_id")]
    pub start_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttendanceRecord {
    /// Distance travelled for this record.
    ///
    /// Zero when either reading is missing or the odometer went backwards.
    pub fn travelled_km(&self) -> f64 {
        match (self.start_km, self.end_km) {
            (Some(start), Some(end)) => (end - start).max(0.0),
            _ => 0.0,
        }
    }
}

/// One visit-log entry. Only the entering user is interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisitRecord {
    #[serde(rename = "EntryByGet", default, deserialize_with = "de::opt_id")]
    pub entry_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: Option<f64>, end: Option<f64>) -> AttendanceRecord {
        AttendanceRecord {
            user_name: "A".to_string(),
            start_km: start,
            end_km: end,
            ..Default::default()
        }
    }

    #[test]
    fn travelled_km_is_difference() {
        assert_eq!(record(Some(10.0), Some(25.0)).travelled_km(), 15.0);
    }

    #[test]
    fn travelled_km_never_negative() {
        assert_eq!(record(Some(40.0), Some(25.0)).travelled_km(), 0.0);
    }

    #[test]
    fn travelled_km_zero_when_reading_missing() {
        assert_eq!(record(None, Some(25.0)).travelled_km(), 0.0);
        assert_eq!(record(Some(10.0), None).travelled_km(), 0.0);
    }

    #[test]
    fn attendance_keeps_unknown_fields() {
        let json = r#"{"UserId": 12, "User_Name": "Ravi", "Start_KM": "100", "End_KM": 130, "Start_Date": "2024-05-01T09:00:00", "Branch_Name": "North"}"#;
        let rec: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.user_id.as_deref(), Some("12"));
        assert_eq!(rec.travelled_km(), 30.0);
        assert_eq!(rec.extra["Branch_Name"], "North");

        let back = serde_json::to_value(&rec).unwrap();
        assert_eq!(back["User_Name"], "Ravi");
        assert_eq!(back["Branch_Name"], "North");
    }

    #[test]
    fn visit_entry_by_from_number() {
        let rec: VisitRecord = serde_json::from_str(r#"{"EntryByGet": 7, "Retailer": "X"}"#).unwrap();
        assert_eq!(rec.entry_by.as_deref(), Some("7"));
    }
}
