use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use crate::dashboard::{ChartData, ChartSpec, Dashboard, TabView, DASHBOARD_TITLE};
use crate::error::OutputError;
use crate::types::SummaryStats;
use crate::util::{average, format_int, format_number, histogram};

/// Buckets used when previewing a rating distribution in the console.
const PREVIEW_BINS: usize = 8;

#[derive(Debug, Clone, Tabled)]
struct PointRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Debug, Clone, Tabled)]
struct BinRow {
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Count")]
    count: String,
}

#[derive(Serialize)]
struct DistributionRow {
    value: f64,
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), OutputError> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    Ok(())
}

/// Write every tab, every chart and the summary under `dir`.
///
/// - `<tab>.json` holds the tab's chart specifications,
/// - `<tab>__<chart>.csv` holds one chart's data,
/// - `summary.json` holds the headline numbers.
///
/// Returns the paths written, in order.
pub fn export_dashboard(
    dir: &Path,
    dashboard: &Dashboard,
    summary: &SummaryStats,
) -> Result<Vec<PathBuf>, OutputError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for view in &dashboard.tabs {
        let tab_path = dir.join(format!("{}.json", view.tab.slug()));
        write_json(&tab_path, view)?;
        written.push(tab_path);

        for chart in &view.charts {
            let chart_path = dir.join(format!("{}__{}.csv", view.tab.slug(), chart.slug()));
            write_chart_csv(&chart_path, chart)?;
            written.push(chart_path);
        }
    }
    let summary_path = dir.join("summary.json");
    write_json(&summary_path, summary)?;
    written.push(summary_path);
    info!("exported {} files to {}", written.len(), dir.display());
    Ok(written)
}

fn write_chart_csv(path: &Path, chart: &ChartSpec) -> Result<(), OutputError> {
    // the csv writer only emits a header alongside the first row
    match &chart.data {
        ChartData::Series(points) if points.is_empty() => fs::write(path, "label,value\n")?,
        ChartData::Series(points) => write_csv(path, points)?,
        ChartData::Distribution(values) if values.is_empty() => fs::write(path, "value\n")?,
        ChartData::Distribution(values) => {
            let rows: Vec<DistributionRow> =
                values.iter().map(|&value| DistributionRow { value }).collect();
            write_csv(path, &rows)?
        }
    }
    Ok(())
}

pub fn print_banner() {
    println!("{}", DASHBOARD_TITLE);
    println!("{}\n", "=".repeat(DASHBOARD_TITLE.len()));
}

/// Row count line shown after every recompute, plus the empty-result warning.
pub fn print_status(dashboard: &Dashboard, filters: &str) {
    println!("Filters: {}", filters);
    println!("Matching rides: {}", format_int(dashboard.row_count));
    if let Some(w) = &dashboard.warning {
        println!("Warning: {}", w);
    }
    println!();
}

pub fn print_summary(summary: &SummaryStats) {
    println!(
        "Rides: {} | Booking value: {} | Distance: {} | Avg driver rating: {} | Avg customer rating: {}\n",
        format_int(summary.total_rides),
        format_number(summary.total_booking_value, 2),
        format_number(summary.total_ride_distance, 2),
        format_number(summary.avg_driver_rating, 2),
        format_number(summary.avg_customer_rating, 2),
    );
}

pub fn print_dashboard(dashboard: &Dashboard, max_rows: usize) {
    for view in &dashboard.tabs {
        print_tab(view, max_rows);
    }
}

pub fn print_tab(view: &TabView, max_rows: usize) {
    println!("== {} ==\n", view.tab.title());
    for chart in &view.charts {
        print_chart(chart, max_rows);
    }
}

fn print_chart(chart: &ChartSpec, max_rows: usize) {
    println!("{} ({:?}: {} vs {})", chart.title, chart.kind, chart.y_label, chart.x_label);
    match &chart.data {
        ChartData::Series(points) => {
            let rows: Vec<PointRow> = points
                .iter()
                .enumerate()
                .map(|(i, p)| PointRow {
                    rank: i + 1,
                    label: p.label.clone(),
                    value: format_value(p.value),
                })
                .collect();
            preview_table_rows(&rows, max_rows);
            if rows.len() > max_rows {
                println!("({} more rows not shown)\n", format_int(rows.len() - max_rows));
            }
        }
        ChartData::Distribution(values) => {
            if !values.is_empty() {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                println!(
                    "n = {}, mean = {}, min = {}, max = {}",
                    format_int(values.len()),
                    format_number(average(values), 2),
                    format_number(min, 2),
                    format_number(max, 2),
                );
            }
            let rows: Vec<BinRow> = histogram(values, PREVIEW_BINS)
                .into_iter()
                .map(|b| BinRow {
                    range: format!("{} - {}", format_number(b.lower, 2), format_number(b.upper, 2)),
                    count: format_int(b.count),
                })
                .collect();
            preview_table_rows(&rows, PREVIEW_BINS);
        }
    }
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format_number(v, 0)
    } else {
        format_number(v, 2)
    }
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table(rows, max_rows) {
        Some(table_str) => println!("{}\n", table_str),
        None => println!("(no rows)\n"),
    }
}

/// Markdown table of the first `max_rows` rows, or `None` when nothing is left to show.
fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard;
    use crate::reports;
    use crate::types::tests::{date, trip};
    use crate::types::TripRecord;
    use tempfile::TempDir;

    #[test]
    fn test_export_dashboard_writes_every_chart() {
        let records = vec![trip(date(7, 1), "Mini", 100.0), trip(date(7, 2), "Sedan", 200.0)];
        let rows: Vec<&TripRecord> = records.iter().collect();
        let dash = dashboard::build(&rows);
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("export");

        let written = export_dashboard(&out, &dash, &reports::summarize(&rows)).unwrap();
        // 5 tab files, 9 chart files, 1 summary
        assert_eq!(written.len(), 15);
        assert!(written.iter().all(|p| p.exists()));

        let revenue =
            fs::read_to_string(out.join("revenue__revenue-by-payment-method.csv")).unwrap();
        assert_eq!(revenue.lines().collect::<Vec<_>>(), vec!["label,value", "Cash,300.0"]);

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
        assert_eq!(summary["total_rides"], 2);
    }

    #[test]
    fn test_export_empty_dashboard() {
        let dash = dashboard::build(&[]);
        let dir = TempDir::new().unwrap();
        export_dashboard(dir.path(), &dash, &reports::summarize(&[])).unwrap();
        let csv_path = dir.path().join("ratings__driver-ratings-distribution.csv");
        let ratings = fs::read_to_string(csv_path).unwrap();
        assert_eq!(ratings, "value\n");
        let overview: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("overview.json")).unwrap())
                .unwrap();
        assert_eq!(overview["tab"], "Overview");
        assert_eq!(overview["charts"][0]["data"]["values"], serde_json::json!([]));
    }

    #[test]
    fn test_render_table_truncates_to_max_rows() {
        let rows: Vec<PointRow> = ["Mini", "Sedan", "Auto"]
            .iter()
            .enumerate()
            .map(|(i, label)| PointRow {
                rank: i + 1,
                label: label.to_string(),
                value: format_value(10.0 * (3 - i) as f64),
            })
            .collect();

        let table = render_table(&rows, 2).unwrap();
        assert!(table.contains("| Label"));
        assert!(table.contains("Mini"));
        assert!(table.contains("Sedan"));
        assert!(!table.contains("Auto"));
        // header, separator and two data rows
        assert_eq!(table.lines().count(), 4);

        assert!(render_table(&rows, 10).unwrap().contains("Auto"));
        assert_eq!(render_table(&rows, 0), None);
        assert_eq!(render_table::<PointRow>(&[], 5), None);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1200.0), "1,200");
        assert_eq!(format_value(12.346), "12.35");
    }
}
