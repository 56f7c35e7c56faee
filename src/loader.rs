use crate::error::LoadError;
use crate::types::{Dataset, RawRow, TripRecord, REQUIRED_COLUMNS};
use crate::util::{clean_text, parse_date_safe, parse_f64_safe};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

/// Load the trip dataset from `path`. Dispatch by extension.
///
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – read `sheet` through calamine
/// * `.csv` – header row plus one trip per line; `sheet` is ignored
///
/// Rows missing a vehicle type, booking status or customer id are skipped and
/// counted. A date that cannot be parsed aborts the load.
pub fn load(path: &Path, sheet: &str) -> Result<(Dataset, LoadReport), LoadError> {
    if !path.exists() {
        return Err(LoadError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, sheet)?,
        "csv" => read_csv(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    debug!("read {} raw rows from {}", raw.len(), path.display());

    let (dataset, report) = clean_rows(raw)?;
    if report.skipped_rows > 0 {
        warn!(
            "skipped {} rows missing vehicle type, booking status or customer id",
            report.skipped_rows
        );
    }
    info!(
        "loaded {} trip records from {}",
        report.loaded_rows,
        path.display()
    );
    Ok((dataset, report))
}

/// Turn raw rows into trip records. Fully blank rows are ignored entirely.
pub fn clean_rows(raw: Vec<RawRow>) -> Result<(Dataset, LoadReport), LoadError> {
    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;
    let mut records = Vec::with_capacity(raw.len());

    for (idx, row) in raw.into_iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        total_rows += 1;
        match clean_row(row, idx + 1)? {
            Some(record) => records.push(record),
            None => skipped_rows += 1,
        }
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        skipped_rows,
    };
    Ok((Dataset::new(records), report))
}

fn clean_row(row: RawRow, line: usize) -> Result<Option<TripRecord>, LoadError> {
    let date = parse_date_safe(row.date.as_deref()).ok_or_else(|| LoadError::InvalidDate {
        row: line,
        value: row.date.clone().unwrap_or_default(),
    })?;

    let vehicle_type = clean_text(row.vehicle_type.as_deref());
    let booking_status = clean_text(row.booking_status.as_deref());
    let customer_id = clean_text(row.customer_id.as_deref());
    let (Some(vehicle_type), Some(booking_status), Some(customer_id)) =
        (vehicle_type, booking_status, customer_id)
    else {
        debug!("row {}: missing a required category, skipped", line);
        return Ok(None);
    };

    Ok(Some(TripRecord {
        date,
        vehicle_type,
        payment_method: clean_text(row.payment_method.as_deref()),
        booking_status,
        ride_distance: parse_f64_safe(row.ride_distance.as_deref()),
        booking_value: parse_f64_safe(row.booking_value.as_deref()),
        customer_id,
        canceled_by_customer: clean_text(row.canceled_by_customer.as_deref()),
        canceled_by_driver: clean_text(row.canceled_by_driver.as_deref()),
        driver_rating: parse_f64_safe(row.driver_rating.as_deref()),
        customer_rating: parse_f64_safe(row.customer_rating.as_deref()),
    }))
}

/// Position of every required column in `headers`, in `REQUIRED_COLUMNS` order.
fn column_positions(headers: &[String]) -> Result<[usize; 11], LoadError> {
    let mut positions = [0usize; 11];
    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))?;
    }
    Ok(positions)
}

fn read_csv(path: &Path) -> Result<Vec<RawRow>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    column_positions(&headers)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

fn read_workbook(path: &Path, sheet: &str) -> Result<Vec<RawRow>, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(LoadError::SheetNotFound(sheet.to_string()));
    }
    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|c| cell_text(c).unwrap_or_default())
            .collect(),
        None => Vec::new(),
    };
    let [
        date,
        vehicle,
        payment,
        status,
        distance,
        value,
        customer,
        by_customer,
        by_driver,
        driver_rating,
        customer_rating,
    ] = column_positions(&headers)?;

    let text = |cells: &[Data], idx: usize| cells.get(idx).and_then(cell_text);
    Ok(rows
        .map(|cells| RawRow {
            date: cells.get(date).and_then(date_text),
            vehicle_type: text(cells, vehicle),
            payment_method: text(cells, payment),
            booking_status: text(cells, status),
            ride_distance: text(cells, distance),
            booking_value: text(cells, value),
            customer_id: text(cells, customer),
            canceled_by_customer: text(cells, by_customer),
            canceled_by_driver: text(cells, by_driver),
            driver_rating: text(cells, driver_rating),
            customer_rating: text(cells, customer_rating),
        })
        .collect())
}

/// Render a workbook cell as the text the row cleaner expects.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        _ => None,
    }
}

fn date_text(cell: &Data) -> Option<String> {
    match cell {
        Data::DateTime(_) => cell.as_date().map(|d| d.format("%Y-%m-%d").to_string()),
        _ => cell_text(cell),
    }
}
