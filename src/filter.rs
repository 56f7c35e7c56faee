use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::types::{Dataset, TripRecord};
use crate::util::format_int;

/// The user's current selections. Everything needed to filter is explicit
/// here; nothing is read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub vehicle_types: BTreeSet<String>,
    pub payment_methods: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria that exclude nothing the dataset offers: its own date span and
    /// every vehicle type and (non-null) payment method it contains.
    pub fn defaults(dataset: &Dataset) -> Self {
        let (start_date, end_date) = dataset
            .date_bounds()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        Self {
            start_date,
            end_date,
            vehicle_types: dataset.vehicle_types().into_iter().collect(),
            payment_methods: dataset.payment_methods().into_iter().collect(),
        }
    }

    /// One-line description for status output.
    pub fn summary(&self, dataset: &Dataset) -> String {
        format!(
            "{} to {} | vehicle types: {}/{} | payment methods: {}/{}",
            self.start_date,
            self.end_date,
            format_int(self.vehicle_types.len()),
            format_int(dataset.vehicle_types().len()),
            format_int(self.payment_methods.len()),
            format_int(dataset.payment_methods().len()),
        )
    }
}

/// True when `record` passes every criterion. A null payment method never
/// matches.
pub fn matches(record: &TripRecord, criteria: &FilterCriteria) -> bool {
    record.date >= criteria.start_date
        && record.date <= criteria.end_date
        && criteria.vehicle_types.contains(&record.vehicle_type)
        && record
            .payment_method
            .as_ref()
            .is_some_and(|p| criteria.payment_methods.contains(p))
}

/// Rows of `records` that match `criteria`, in their original order.
///
/// An inverted date range simply matches nothing.
pub fn apply<'a>(records: &'a [TripRecord], criteria: &FilterCriteria) -> Vec<&'a TripRecord> {
    records.iter().filter(|r| matches(r, criteria)).collect()
}
