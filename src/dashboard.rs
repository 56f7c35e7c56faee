//! The fixed five-tab dashboard: which charts appear where, and the data each
//! one is drawn from. Rendering itself happens elsewhere; a [`ChartSpec`] only
//! names the chart kind, its axes and its points.

use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::EmptyResultWarning;
use crate::reports;
use crate::types::{GroupCount, GroupSum, TripRecord};
use crate::util::slugify;

pub const DASHBOARD_TITLE: &str = "Ola Ride Insights Dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tab {
    #[serde(rename = "Overview")]
    Overview,
    #[serde(rename = "Vehicle Insights")]
    VehicleInsights,
    #[serde(rename = "Revenue")]
    Revenue,
    #[serde(rename = "Cancellations")]
    Cancellations,
    #[serde(rename = "Ratings")]
    Ratings,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::VehicleInsights,
        Tab::Revenue,
        Tab::Cancellations,
        Tab::Ratings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::VehicleInsights => "Vehicle Insights",
            Tab::Revenue => "Revenue",
            Tab::Cancellations => "Cancellations",
            Tab::Ratings => "Ratings",
        }
    }

    pub fn slug(self) -> String {
        slugify(self.title())
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Tab {
    type Err = String;

    /// Accepts the title or its slug, ignoring case (`"Vehicle Insights"`,
    /// `"vehicle-insights"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = slugify(s);
        Tab::ALL
            .into_iter()
            .find(|t| t.slug() == wanted)
            .ok_or_else(|| {
                let names: Vec<String> = Tab::ALL.iter().map(|t| t.slug()).collect();
                format!("unknown tab '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ChartData {
    /// Labelled values, one bar or line vertex each.
    Series(Vec<ChartPoint>),
    /// Raw observations for the renderer to bin.
    Distribution(Vec<f64>),
}

impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            ChartData::Series(points) => points.len(),
            ChartData::Distribution(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: &'static str,
    pub kind: ChartKind,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn slug(&self) -> String {
        slugify(self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub tab: Tab,
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub row_count: usize,
    pub warning: Option<EmptyResultWarning>,
    pub tabs: Vec<TabView>,
}

impl Dashboard {
    pub fn tab(&self, tab: Tab) -> Option<&TabView> {
        self.tabs.iter().find(|v| v.tab == tab)
    }
}

/// Recompute every tab from the filtered rows.
pub fn build(rows: &[&TripRecord]) -> Dashboard {
    let warning = if rows.is_empty() {
        warn!("{}", EmptyResultWarning);
        Some(EmptyResultWarning)
    } else {
        None
    };
    debug!("building dashboard over {} rows", rows.len());
    Dashboard {
        row_count: rows.len(),
        warning,
        tabs: Tab::ALL.iter().map(|&t| build_tab(t, rows)).collect(),
    }
}

pub fn build_tab(tab: Tab, rows: &[&TripRecord]) -> TabView {
    let charts = match tab {
        Tab::Overview => vec![
            ChartSpec {
                title: "Ride Volume Over Time",
                kind: ChartKind::Line,
                x_label: "Date",
                y_label: "Number of Rides",
                data: ChartData::Series(
                    reports::rides_per_day(rows)
                        .into_iter()
                        .map(|d| ChartPoint {
                            label: d.date.format("%Y-%m-%d").to_string(),
                            value: d.rides as f64,
                        })
                        .collect(),
                ),
            },
            bar(
                "Booking Status Breakdown",
                "Booking Status",
                "Count",
                counts(reports::status_breakdown(rows)),
            ),
        ],
        Tab::VehicleInsights => vec![bar(
            "Top 5 Vehicle Types by Ride Distance",
            "Vehicle Type",
            "Ride Distance",
            sums(reports::top_vehicles_by_distance(rows)),
        )],
        Tab::Revenue => vec![
            bar(
                "Revenue by Payment Method",
                "Payment Method",
                "Booking Value",
                sums(reports::revenue_by_payment_method(rows)),
            ),
            bar(
                "Top 5 Customers by Total Booking Value",
                "Customer ID",
                "Booking Value",
                sums(reports::top_customers_by_value(rows)),
            ),
        ],
        Tab::Cancellations => vec![
            bar(
                "Cancelled Rides by Customer Reason",
                "Reason",
                "Count",
                counts(reports::customer_cancellation_reasons(rows)),
            ),
            bar(
                "Cancelled Rides by Driver Reason",
                "Reason",
                "Count",
                counts(reports::driver_cancellation_reasons(rows)),
            ),
        ],
        Tab::Ratings => vec![
            histogram(
                "Driver Ratings Distribution",
                "Driver Rating",
                reports::driver_rating_distribution(rows),
            ),
            histogram(
                "Customer Ratings Distribution",
                "Customer Rating",
                reports::customer_rating_distribution(rows),
            ),
        ],
    };
    TabView { tab, charts }
}

fn bar(
    title: &'static str,
    x_label: &'static str,
    y_label: &'static str,
    points: Vec<ChartPoint>,
) -> ChartSpec {
    ChartSpec {
        title,
        kind: ChartKind::Bar,
        x_label,
        y_label,
        data: ChartData::Series(points),
    }
}

fn histogram(title: &'static str, x_label: &'static str, values: Vec<f64>) -> ChartSpec {
    ChartSpec {
        title,
        kind: ChartKind::Histogram,
        x_label,
        y_label: "Count",
        data: ChartData::Distribution(values),
    }
}

fn counts(groups: Vec<GroupCount>) -> Vec<ChartPoint> {
    groups
        .into_iter()
        .map(|g| ChartPoint {
            label: g.key,
            value: g.count as f64,
        })
        .collect()
}

fn sums(groups: Vec<GroupSum>) -> Vec<ChartPoint> {
    groups
        .into_iter()
        .map(|g| ChartPoint {
            label: g.key,
            value: g.total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::{date, trip};

    #[test]
    fn test_tabs_and_chart_order_are_fixed() {
        let records = vec![trip(date(7, 1), "Mini", 100.0)];
        let rows: Vec<&TripRecord> = records.iter().collect();
        let dash = build(&rows);
        let titles: Vec<&str> = dash.tabs.iter().map(|t| t.tab.title()).collect();
        assert_eq!(
            titles,
            vec!["Overview", "Vehicle Insights", "Revenue", "Cancellations", "Ratings"]
        );
        let per_tab: Vec<usize> = dash.tabs.iter().map(|t| t.charts.len()).collect();
        assert_eq!(per_tab, vec![2, 1, 2, 2, 2]);

        let overview = dash.tab(Tab::Overview).unwrap();
        assert_eq!(overview.charts[0].kind, ChartKind::Line);
        assert_eq!(
            overview.charts[0].data,
            ChartData::Series(vec![ChartPoint {
                label: "2024-07-01".to_string(),
                value: 1.0
            }])
        );
        let ratings = dash.tab(Tab::Ratings).unwrap();
        assert_eq!(ratings.charts[0].data, ChartData::Distribution(vec![4.5]));
        assert!(dash.warning.is_none());
    }

    #[test]
    fn test_empty_rows_warn_and_render_empty() {
        let dash = build(&[]);
        assert_eq!(dash.row_count, 0);
        assert_eq!(dash.warning, Some(EmptyResultWarning));
        assert!(dash
            .tabs
            .iter()
            .flat_map(|t| t.charts.iter())
            .all(|c| c.data.is_empty()));
    }

    #[test]
    fn test_tab_from_str() {
        assert_eq!("overview".parse::<Tab>(), Ok(Tab::Overview));
        assert_eq!("Vehicle Insights".parse::<Tab>(), Ok(Tab::VehicleInsights));
        assert_eq!("vehicle-insights".parse::<Tab>(), Ok(Tab::VehicleInsights));
        assert!("maps".parse::<Tab>().is_err());
    }

    #[test]
    fn test_chart_spec_serializes_for_renderers() {
        let spec = bar(
            "Revenue by Payment Method",
            "Payment Method",
            "Booking Value",
            vec![ChartPoint {
                label: "Cash".to_string(),
                value: 300.0,
            }],
        );
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["data"]["type"], "series");
        assert_eq!(json["data"]["values"][0]["label"], "Cash");
        assert_eq!(spec.slug(), "revenue-by-payment-method");
    }
}
