use std::io;

use thiserror::Error;

/// Fatal failures while reading the trip dataset at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Excel: {0}")]
    Excel(#[from] calamine::Error),
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("worksheet '{0}' not found")]
    SheetNotFound(String),
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    #[error("row {row}: cannot parse date '{value}'")]
    InvalidDate { row: usize, value: String },
}

/// Raised (not returned) when the current filters leave no rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no trip records match the current filters; all charts are empty")]
pub struct EmptyResultWarning;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}
