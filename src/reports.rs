use crate::types::{DailyCount, GroupCount, GroupSum, SummaryStats, TripRecord};
use crate::util::average;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

pub const TOP_VEHICLES: usize = 5;
pub const TOP_CUSTOMERS: usize = 5;
pub const TOP_CANCEL_REASONS: usize = 10;

// Every aggregation below takes the filtered view and never mutates it.
// Null grouping keys are dropped. Descending sorts are stable: tied sums
// stay in key order, tied counts in the order their group first appeared.

/// Number of rides per calendar day, earliest day first.
pub fn rides_per_day(rows: &[&TripRecord]) -> Vec<DailyCount> {
    let mut by_day: BTreeMap<_, usize> = BTreeMap::new();
    for r in rows {
        *by_day.entry(r.date).or_default() += 1;
    }
    by_day
        .into_iter()
        .map(|(date, rides)| DailyCount { date, rides })
        .collect()
}

/// Rides per booking status, most frequent first.
pub fn status_breakdown(rows: &[&TripRecord]) -> Vec<GroupCount> {
    let mut counts = count_by(rows.iter().map(|r| Some(r.booking_status.as_str())));
    sort_counts_desc(&mut counts);
    counts
}

pub fn top_vehicles_by_distance(rows: &[&TripRecord]) -> Vec<GroupSum> {
    let mut totals = sum_by(
        rows.iter()
            .map(|r| (Some(r.vehicle_type.as_str()), r.ride_distance)),
    );
    sort_totals_desc(&mut totals);
    totals.truncate(TOP_VEHICLES);
    totals
}

/// Booking value per payment method, in payment method order.
pub fn revenue_by_payment_method(rows: &[&TripRecord]) -> Vec<GroupSum> {
    sum_by(rows.iter().map(|r| (r.payment_method.as_deref(), r.booking_value)))
}

pub fn top_customers_by_value(rows: &[&TripRecord]) -> Vec<GroupSum> {
    let mut totals = sum_by(
        rows.iter()
            .map(|r| (Some(r.customer_id.as_str()), r.booking_value)),
    );
    sort_totals_desc(&mut totals);
    totals.truncate(TOP_CUSTOMERS);
    totals
}

pub fn customer_cancellation_reasons(rows: &[&TripRecord]) -> Vec<GroupCount> {
    top_reasons(rows.iter().map(|r| r.canceled_by_customer.as_deref()))
}

pub fn driver_cancellation_reasons(rows: &[&TripRecord]) -> Vec<GroupCount> {
    top_reasons(rows.iter().map(|r| r.canceled_by_driver.as_deref()))
}

pub fn driver_rating_distribution(rows: &[&TripRecord]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.driver_rating).collect()
}

pub fn customer_rating_distribution(rows: &[&TripRecord]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.customer_rating).collect()
}

/// Headline numbers for the filtered view.
pub fn summarize(rows: &[&TripRecord]) -> SummaryStats {
    let total_booking_value: f64 = rows.iter().filter_map(|r| r.booking_value).sum();
    let total_ride_distance: f64 = rows.iter().filter_map(|r| r.ride_distance).sum();
    SummaryStats {
        total_rides: rows.len(),
        total_booking_value,
        total_ride_distance,
        avg_driver_rating: average(&driver_rating_distribution(rows)),
        avg_customer_rating: average(&customer_rating_distribution(rows)),
        first_date: rows.iter().map(|r| r.date).min(),
        last_date: rows.iter().map(|r| r.date).max(),
    }
}

fn top_reasons<'a, I>(reasons: I) -> Vec<GroupCount>
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut counts = count_by(reasons);
    sort_counts_desc(&mut counts);
    counts.truncate(TOP_CANCEL_REASONS);
    counts
}

/// Count occurrences of each non-null key, groups in first-appearance order.
fn count_by<'a, I>(keys: I) -> Vec<GroupCount>
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<GroupCount> = Vec::new();
    for key in keys.flatten() {
        let i = *index.entry(key).or_insert_with(|| {
            out.push(GroupCount {
                key: key.to_string(),
                count: 0,
            });
            out.len() - 1
        });
        out[i].count += 1;
    }
    out
}

/// Sum values per non-null key, groups in key order. Null values add
/// nothing, so a group of only nulls totals 0.
fn sum_by<'a, I>(pairs: I) -> Vec<GroupSum>
where
    I: Iterator<Item = (Option<&'a str>, Option<f64>)>,
{
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for (key, value) in pairs {
        let Some(key) = key else { continue };
        *totals.entry(key).or_default() += value.unwrap_or(0.0);
    }
    totals
        .into_iter()
        .map(|(key, total)| GroupSum {
            key: key.to_string(),
            total,
        })
        .collect()
}

fn sort_counts_desc(v: &mut [GroupCount]) {
    v.sort_by(|a, b| b.count.cmp(&a.count));
}

fn sort_totals_desc(v: &mut [GroupSum]) {
    v.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
}
