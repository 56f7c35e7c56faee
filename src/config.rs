use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::dashboard::Tab;
use crate::filter::FilterCriteria;
use crate::types::Dataset;

pub const DEFAULT_SOURCE: &str = "OLA_DataSet.xlsx";
pub const DEFAULT_SHEET: &str = "July";

#[derive(Parser, Debug, Clone)]
#[command(name = "ride_insights")]
#[command(about = "Filter ride-hailing trip records and report on them", long_about = None)]
pub struct Cli {
    /// Spreadsheet (.xlsx, .xls, .ods) or CSV file with the trip records
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_SOURCE)]
    pub source: PathBuf,

    /// Worksheet to read from a spreadsheet source
    #[arg(long, default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// First trip date to include (YYYY-MM-DD); defaults to the earliest in the data
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last trip date to include (YYYY-MM-DD); defaults to the latest in the data
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Vehicle type to include (repeatable); all types when omitted
    #[arg(long = "vehicle", value_name = "TYPE")]
    pub vehicle_types: Vec<String>,

    /// Payment method to include (repeatable); all methods when omitted
    #[arg(long = "payment", value_name = "METHOD")]
    pub payment_methods: Vec<String>,

    /// Only print this tab (overview, vehicle-insights, revenue, cancellations, ratings)
    #[arg(long)]
    pub tab: Option<Tab>,

    /// Write tab JSON, chart CSV and summary files into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Maximum rows shown per console table
    #[arg(long, default_value_t = 10)]
    pub preview_rows: usize,

    /// Run the interactive filter menu
    #[arg(short, long)]
    pub interactive: bool,
}

impl Cli {
    /// Starting criteria: the dataset defaults with any flags applied on top.
    pub fn criteria(&self, dataset: &Dataset) -> FilterCriteria {
        let mut criteria = FilterCriteria::defaults(dataset);
        if let Some(start) = self.start {
            criteria.start_date = start;
        }
        if let Some(end) = self.end {
            criteria.end_date = end;
        }
        if !self.vehicle_types.is_empty() {
            criteria.vehicle_types = self.vehicle_types.iter().cloned().collect();
        }
        if !self.payment_methods.is_empty() {
            criteria.payment_methods = self.payment_methods.iter().cloned().collect();
        }
        criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::{date, trip};

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ride_insights"]);
        assert_eq!(cli.source, PathBuf::from(DEFAULT_SOURCE));
        assert_eq!(cli.sheet, DEFAULT_SHEET);
        assert_eq!(cli.preview_rows, 10);
        assert!(cli.tab.is_none());
        assert!(!cli.interactive);
    }

    #[test]
    fn test_flags_override_dataset_defaults() {
        let cli = Cli::parse_from([
            "ride_insights",
            "--source",
            "rides.csv",
            "--start",
            "2024-07-02",
            "--vehicle",
            "Mini",
            "--vehicle",
            "Auto",
            "--tab",
            "vehicle-insights",
        ]);
        assert_eq!(cli.tab, Some(Tab::VehicleInsights));

        let ds = Dataset::new(vec![trip(date(7, 1), "Mini", 1.0), trip(date(7, 5), "Sedan", 1.0)]);
        let criteria = cli.criteria(&ds);
        assert_eq!(criteria.start_date, date(7, 2));
        assert_eq!(criteria.end_date, date(7, 5));
        assert_eq!(criteria.vehicle_types.len(), 2);
        assert!(criteria.vehicle_types.contains("Auto"));
        assert_eq!(criteria.payment_methods.len(), 1);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(Cli::try_parse_from(["ride_insights", "--tab", "maps"]).is_err());
        assert!(Cli::try_parse_from(["ride_insights", "--start", "July 1"]).is_err());
    }
}
