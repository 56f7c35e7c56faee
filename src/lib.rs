//! Ride-hailing trip reporting: load a trip spreadsheet once, filter it by
//! date range, vehicle type and payment method, and aggregate the filtered
//! view into a fixed five-tab dashboard of chart specifications.
//!
//! ```text
//!  .xlsx / .csv ──► loader ──► Dataset (immutable)
//!                                  │
//!            FilterCriteria ──► filter::apply ──► &[&TripRecord]
//!                                                      │
//!                               reports::* ◄───────────┘
//!                                  │
//!                              dashboard::build ──► output (console / files)
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
