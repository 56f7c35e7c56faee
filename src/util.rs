// Utility helpers for parsing, formatting and basic statistics.
//
// All of the forgiving cell handling lives here so the rest of the code can
// assume clean, typed values.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use std::collections::BTreeSet;
use std::io::BufRead;

/// Cell contents that the spreadsheet reader treats as a missing value.
const NA_TOKENS: &[&str] = &["", "NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL", "None"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Trim a text cell and map the missing-value tokens to `None`.
pub fn clean_text(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if NA_TOKENS.contains(&s) {
        return None;
    }
    Some(s.to_string())
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`"null"`, `"NaN"`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

/// Parse a date cell, dropping any time-of-day component.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// One equal-width bucket of a histogram, `[lower, upper)` except the last
/// bucket which also includes `upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Split `values` into `bins` equal-width buckets between their min and max.
///
/// Returns no buckets for empty input or `bins == 0`. When every value is the
/// same a single bucket holds them all.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;
    if width <= 0.0 || !width.is_finite() {
        return vec![Bin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Lower-case, dash-separated form of a title, safe for file names.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Resolve a multi-select answer against the offered options.
///
/// Accepts `all` or a comma-separated list of 1-based option numbers.
pub fn parse_selection(input: &str, options: &[String]) -> Result<BTreeSet<String>, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Ok(options.iter().cloned().collect());
    }
    let mut selected = BTreeSet::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let idx: usize = part
            .parse()
            .map_err(|_| format!("'{}' is not an option number", part))?;
        let value = idx
            .checked_sub(1)
            .and_then(|i| options.get(i))
            .ok_or_else(|| format!("option {} is out of range (1-{})", idx, options.len()))?;
        selected.insert(value.clone());
    }
    Ok(selected)
}

/// Read one trimmed answer line. `None` once input is closed or unreadable.
pub fn read_answer<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut buf = String::new();
    match reader.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_maps_na_tokens() {
        assert_eq!(clean_text(Some("  Mini ")), Some("Mini".to_string()));
        assert_eq!(clean_text(Some("null")), None);
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
    }

    #[test]
    fn test_parse_f64_safe() {
        assert_eq!(parse_f64_safe(Some("1,234.5")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some(" 4 ")), Some(4.0));
        assert_eq!(parse_f64_safe(Some("null")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 7, 26).unwrap();
        assert_eq!(parse_date_safe(Some("2024-07-26")), Some(d));
        assert_eq!(parse_date_safe(Some("2024-07-26 14:00:00")), Some(d));
        assert_eq!(parse_date_safe(Some("2024-07-26T14:00:00")), Some(d));
        assert_eq!(parse_date_safe(Some("07/26/2024")), Some(d));
        assert_eq!(parse_date_safe(Some("26-07-2024")), Some(d));
        assert_eq!(parse_date_safe(Some("yesterday")), None);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let bins = histogram(&values, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        // max lands in the last bucket
        assert_eq!(bins[3].count, 2);
    }

    #[test]
    fn test_histogram_degenerate_inputs() {
        assert!(histogram(&[], 5).is_empty());
        let same = histogram(&[4.0, 4.0], 5);
        assert_eq!(same.len(), 1);
        assert_eq!(same[0].count, 2);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Vehicle Insights"), "vehicle-insights");
        assert_eq!(
            slugify("Top 5 Vehicle Types by Ride Distance"),
            "top-5-vehicle-types-by-ride-distance"
        );
    }

    #[test]
    fn test_read_answer_stops_at_end_of_input() {
        let mut input = std::io::Cursor::new("3\n\n");
        assert_eq!(read_answer(&mut input), Some("3".to_string()));
        // a blank line is still an answer
        assert_eq!(read_answer(&mut input), Some(String::new()));
        assert_eq!(read_answer(&mut input), None);
        assert_eq!(read_answer(&mut std::io::Cursor::new("")), None);
    }

    #[test]
    fn test_parse_selection() {
        let opts = vec!["Auto".to_string(), "Bike".to_string(), "Mini".to_string()];
        assert_eq!(parse_selection("all", &opts).unwrap().len(), 3);
        let picked = parse_selection("1, 3", &opts).unwrap();
        assert!(picked.contains("Auto") && picked.contains("Mini"));
        assert!(parse_selection("4", &opts).is_err());
        assert!(parse_selection("x", &opts).is_err());
        assert!(parse_selection("", &opts).unwrap().is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(9855), "9,855");
    }
}
