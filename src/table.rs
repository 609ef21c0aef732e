// src/table.rs
use crate::data_types::{RawGrid, Record};

/// Turns a grid into records, using the first row as field names.
///
/// Cells past the end of the header are dropped. A short row simply
/// lacks the trailing fields; they are not filled with empty strings.
pub fn normalize(grid: &RawGrid) -> Vec<Record> {
    let mut rows = grid.iter();
    let headers: &[String] = match rows.next() {
        Some(headers) => headers,
        None => return Vec::new(),
    };

    rows.map(|row| {
        headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.as_str(), cell.as_str()))
            .collect()
    })
    .collect()
}

/// Keeps only the records with something to show in `text`.
pub fn filter_blank_text(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| !is_blank(record.text()))
        .collect()
}

/// Full pipeline from the raw sheet to the rotation set.
pub fn to_ticker_records(grid: &RawGrid) -> Vec<Record> {
    filter_blank_text(normalize(grid))
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}
