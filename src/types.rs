use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column headers every source must carry, in the order they are checked.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "Date",
    "Vehicle_Type",
    "Payment_Method",
    "Booking_Status",
    "Ride_Distance",
    "Booking_Value",
    "Customer_ID",
    "Canceled_Rides_by_Customer",
    "Canceled_Rides_by_Driver",
    "Driver_Ratings",
    "Customer_Rating",
];

/// One row exactly as read from the source, before any cleaning.
#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Vehicle_Type")]
    pub vehicle_type: Option<String>,
    #[serde(rename = "Payment_Method")]
    pub payment_method: Option<String>,
    #[serde(rename = "Booking_Status")]
    pub booking_status: Option<String>,
    #[serde(rename = "Ride_Distance")]
    pub ride_distance: Option<String>,
    #[serde(rename = "Booking_Value")]
    pub booking_value: Option<String>,
    #[serde(rename = "Customer_ID")]
    pub customer_id: Option<String>,
    #[serde(rename = "Canceled_Rides_by_Customer")]
    pub canceled_by_customer: Option<String>,
    #[serde(rename = "Canceled_Rides_by_Driver")]
    pub canceled_by_driver: Option<String>,
    #[serde(rename = "Driver_Ratings")]
    pub driver_rating: Option<String>,
    #[serde(rename = "Customer_Rating")]
    pub customer_rating: Option<String>,
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        [
            &self.date,
            &self.vehicle_type,
            &self.payment_method,
            &self.booking_status,
            &self.ride_distance,
            &self.booking_value,
            &self.customer_id,
            &self.canceled_by_customer,
            &self.canceled_by_driver,
            &self.driver_rating,
            &self.customer_rating,
        ]
        .iter()
        .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub date: NaiveDate,
    pub vehicle_type: String,
    pub payment_method: Option<String>,
    pub booking_status: String,
    pub ride_distance: Option<f64>,
    pub booking_value: Option<f64>,
    pub customer_id: String,
    pub canceled_by_customer: Option<String>,
    pub canceled_by_driver: Option<String>,
    pub driver_rating: Option<f64>,
    pub customer_rating: Option<f64>,
}

/// The trip records of one source, in file order. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<TripRecord>,
}

impl Dataset {
    pub fn new(records: Vec<TripRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest trip date, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.date), hi.max(r.date))
        }))
    }

    /// Distinct vehicle types in first-appearance order.
    pub fn vehicle_types(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| Some(r.vehicle_type.as_str())))
    }

    /// Distinct payment methods in first-appearance order. Nulls are never offered.
    pub fn payment_methods(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.payment_method.as_deref()))
    }
}

fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for v in values.flatten() {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Rides")]
    pub rides: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSum {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Total")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_rides: usize,
    pub total_booking_value: f64,
    pub total_ride_distance: f64,
    pub avg_driver_rating: f64,
    pub avg_customer_rating: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    /// A completed cash trip; tests override the fields they care about.
    pub(crate) fn trip(date: NaiveDate, vehicle_type: &str, value: f64) -> TripRecord {
        TripRecord {
            date,
            vehicle_type: vehicle_type.to_string(),
            payment_method: Some("Cash".to_string()),
            booking_status: "Success".to_string(),
            ride_distance: Some(10.0),
            booking_value: Some(value),
            customer_id: "CID1".to_string(),
            canceled_by_customer: None,
            canceled_by_driver: None,
            driver_rating: Some(4.5),
            customer_rating: Some(4.0),
        }
    }

    #[test]
    fn test_date_bounds() {
        let ds = Dataset::new(vec![
            trip(date(7, 5), "Mini", 1.0),
            trip(date(7, 2), "Mini", 1.0),
            trip(date(7, 9), "Mini", 1.0),
        ]);
        assert_eq!(ds.date_bounds(), Some((date(7, 2), date(7, 9))));
        assert_eq!(Dataset::default().date_bounds(), None);
    }

    #[test]
    fn test_distinct_values_keep_first_appearance() {
        let mut upi = trip(date(7, 1), "Sedan", 1.0);
        upi.payment_method = Some("UPI".to_string());
        let mut unpaid = trip(date(7, 1), "Auto", 1.0);
        unpaid.payment_method = None;
        let ds = Dataset::new(vec![
            upi,
            trip(date(7, 1), "Mini", 1.0),
            unpaid,
            trip(date(7, 1), "Sedan", 1.0),
        ]);
        assert_eq!(ds.vehicle_types(), vec!["Sedan", "Mini", "Auto"]);
        assert_eq!(ds.payment_methods(), vec!["UPI", "Cash"]);
    }

    #[test]
    fn test_blank_raw_row() {
        assert!(RawRow::default().is_blank());
        let row = RawRow {
            customer_rating: Some(" 4 ".to_string()),
            ..Default::default()
        };
        assert!(!row.is_blank());
    }
}
