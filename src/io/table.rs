//! Delimited text ingestion of daily energy exports.
//!
//! The expected layout is a header row, an optional units row whose first
//! field starts with `[` (e.g. `[dd.MM.yyyy],[Wh],...`), and one row per day
//! with energy values in watt-hours. Fields are comma-separated and may be
//! enclosed in double quotes.

use std::io::Read;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::EnergyRecord;

use super::mapping::ColumnMapping;

/// Primary date layout of the exports (`dd.MM.yyyy`).
const DATE_FORMAT: &str = "%d.%m.%Y";

/// Day-first and ISO date layouts accepted when the primary one fails.
const FALLBACK_DATE_FORMATS: &[&str] = &["%d.%m.%y", "%Y-%m-%d", "%d/%m/%Y"];

/// Date-time layouts accepted when the primary one fails; time is dropped.
/// Two-digit years go first since `%Y` would read `24` as year 24.
const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%d.%m.%y %H:%M",
    "%d.%m.%y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(b',')
        .quote(b'"');
    builder
}

/// Parses a calendar day, discarding any time-of-day component.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(date) = NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|d| d.year() >= 100)
    {
        return Some(date);
    }
    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            FALLBACK_DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
}

/// Parses a number that may use `,` or `.` as decimal separator.
///
/// Blank, unparsable or non-finite values (`NaN`, `inf`) read as zero.
pub fn parse_number(value: &str) -> f64 {
    let value = value.trim();
    if value.is_empty() {
        return 0.0;
    }
    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

fn is_units_row(record: &StringRecord) -> bool {
    record.get(0).is_some_and(|f| f.starts_with('['))
}

/// Reads the header row.
///
/// # Errors
///
/// Returns [`Error::MissingHeader`] if the input is empty or the first row
/// is blank, and [`Error::Csv`] if the first row cannot be read.
pub fn read_headers<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut rdr = reader_builder().from_reader(reader);
    let mut record = StringRecord::new();
    if !rdr.read_record(&mut record)? || is_blank(&record) {
        return Err(Error::MissingHeader);
    }
    Ok(record.iter().map(str::to_string).collect())
}

/// Converts one data row, or `None` if the row is unusable.
fn parse_row(record: &StringRecord, mapping: &ColumnMapping, min_len: usize) -> Option<EnergyRecord> {
    if record.len() < min_len {
        return None;
    }

    let field = |index: Option<usize>| index.and_then(|i| record.get(i)).map_or(0.0, parse_number);

    let date = parse_date(record.get(mapping.date?)?)?;
    Some(EnergyRecord {
        date,
        total_generation_wh: field(mapping.total_generation),
        total_consumption_wh: field(mapping.total_consumption),
        self_consumption_wh: field(mapping.self_consumption),
        fed_to_grid_wh: field(mapping.fed_to_grid),
        drawn_from_grid_wh: field(mapping.drawn_from_grid),
    })
}

/// Parses all data rows into energy records using `mapping`.
///
/// Rows too short to reach every mapped column, with an unparsable date or
/// a malformed encoding are dropped; only the total count of valid rows matters for success.
///
/// # Errors
///
/// Returns [`Error::InvalidMapping`] if a required role is unmapped,
/// [`Error::MissingHeader`] if there is no header row and
/// [`Error::NoValidRows`] if no row could be parsed.
pub fn parse_records<R: Read>(reader: R, mapping: &ColumnMapping) -> Result<Vec<EnergyRecord>> {
    let missing = mapping.missing_roles();
    if !missing.is_empty() {
        return Err(Error::InvalidMapping { missing });
    }
    let min_len = mapping.max_mapped_index().map_or(0, |i| i + 1);

    let mut rows = reader_builder().from_reader(reader).into_records();

    match rows.next() {
        Some(Ok(header)) if !is_blank(&header) => {}
        Some(Err(e)) => return Err(e.into()),
        _ => return Err(Error::MissingHeader),
    }

    let mut records = Vec::new();
    let mut dropped = 0_usize;

    for (line, row) in rows.enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                debug!(error = %e, "dropping unreadable row");
                dropped += 1;
                continue;
            }
        };
        if line == 0 && is_units_row(&row) {
            debug!("skipping units row");
            continue;
        }
        if is_blank(&row) {
            continue;
        }

        match parse_row(&row, mapping, min_len) {
            Some(record) => records.push(record),
            None => {
                debug!(row = ?row.iter().collect::<Vec<_>>(), "dropping invalid row");
                dropped += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(Error::NoValidRows);
    }

    info!(records = records.len(), dropped, "energy data parsed");
    Ok(records)
}
