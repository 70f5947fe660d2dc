//! Cell-level parsing for dates and nutrient amounts.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Date-only layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Date-with-time layouts as written by the spreadsheet export
/// (e.g. `05/01/2024 8:30AM`), tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %I:%M%p",
    "%d/%m/%Y %I:%M %p",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a calendar date from a cell.
///
/// RFC 3339 timestamps carry their own offset and are converted into `zone`
/// before the date is taken. Local date-times are taken as written.
pub fn parse_date(raw: &str, zone: &FixedOffset) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(zone).date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// Parses a nutrient amount. Blank cells count as zero.
///
/// # Errors
///
/// Returns a description of the problem if the cell is not a finite,
/// non-negative number.
pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }

    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;

    check_amount(value)
}

/// Rejects amounts that cannot be a nutrient quantity.
pub fn check_amount(value: f64) -> Result<f64, String> {
    if !value.is_finite() {
        Err(format!("{value} is not a finite amount"))
    } else if value < 0.0 {
        Err(format!("{value} is negative"))
    } else {
        Ok(value)
    }
}
