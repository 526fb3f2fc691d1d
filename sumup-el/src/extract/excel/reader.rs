//! Read records from the active sheet of an Excel workbook
//!
//! The first row of the sheet is the header row. Every later row becomes a
//! [`Record`] keyed by those headers; rows where every cell is empty are
//! dropped.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, ExcelDateTime, Range, Reader, Xlsx, open_workbook};

use crate::extract::types::{Record, Value, parse_timestamp};

/// Contents of a sheet after conversion
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    /// Header row, in column order. Empty strings mark ignored columns.
    pub headers: Vec<String>,
    /// Data rows
    pub records: Vec<Record>,
}

/// Read all records from the active sheet of a workbook
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    Ok(read_sheet(path)?.records)
}

/// Read the header row and all records from the active sheet of a workbook
pub fn read_sheet<P: AsRef<Path>>(path: P) -> Result<Sheet> {
    let path = path.as_ref();
    let (name, range) = load_active_range(path)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(header_name).collect(),
        None => Vec::new(),
    };

    let records: Vec<Record> = rows
        .filter_map(|row| row_to_record(&headers, row))
        .collect();

    log::debug!(
        "Read {} records with {} columns from sheet '{}' of {}",
        records.len(),
        headers.len(),
        name,
        path.display()
    );

    Ok(Sheet {
        name,
        headers,
        records,
    })
}

/// Open the workbook and copy out the first sheet's cells.
///
/// The workbook owns the file handle and is dropped when this returns, on the
/// error paths as well.
fn load_active_range(path: &Path) -> Result<(String, Range<Data>)> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("Excel file has no sheets: {}", path.display()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet '{}' of {}", sheet_name, path.display()))?;

    Ok((sheet_name, range))
}

/// Build a record from a data row, or `None` if every field is empty
fn row_to_record(headers: &[String], row: &[Data]) -> Option<Record> {
    let mut record = Record::with_capacity(headers.len());
    for (header, cell) in headers.iter().zip(row) {
        if header.is_empty() {
            continue;
        }
        record.push(header.clone(), cell_to_value(cell));
    }

    (!record.is_blank()).then_some(record)
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

/// Convert an Excel cell to a record value
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Empty,
        Data::String(s) if s.is_empty() => Value::Empty,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::from_number(*f),
        Data::Bool(b) => Value::Int(i64::from(*b)),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return Value::Text(format_duration(dt));
            }
            match dt.as_datetime() {
                Some(ts) => Value::Timestamp(ts),
                None => Value::Float(dt.as_f64()),
            }
        }
        Data::DateTimeIso(s) => match parse_timestamp(s) {
            Some(ts) => Value::Timestamp(ts),
            None => Value::Text(s.clone()),
        },
        Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// Render an elapsed-time cell the way Excel shows `[h]:mm:ss`
fn format_duration(dt: &ExcelDateTime) -> String {
    let total = (dt.as_f64() * 86_400.0).round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let secs = total.abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        secs / 3600,
        secs % 3600 / 60,
        secs % 60
    )
}
