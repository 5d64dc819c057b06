//! Best-effort CSV reader
//!
//! The first line names the fields; every following line is split on commas
//! and zipped positionally with the header. Cells are typed with
//! [`CellValue::coerce`]. Quoting, escaping and embedded newlines are not
//! supported.
//!
//! - ragged rows leave trailing fields absent
//! - cells past the last header are ignored
//! - blank lines and rows with no populated cell (`,,,,`) are dropped

use waterfall_core::{CellValue, RawRecord};

/// Parse CSV text into raw records, one per populated data line
pub fn parse_csv(input: &str) -> Vec<RawRecord> {
    let mut lines = input.split('\n').map(strip_cr);

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let header: Vec<&str> = header_line.split(',').collect();

    let rows: Vec<RawRecord> = lines
        .filter(|line| !line.is_empty())
        .map(|line| parse_row(&header, line))
        .filter(|row| row.iter().any(|(_, value)| !value.is_null()))
        .collect();

    tracing::debug!(fields = header.len(), rows = rows.len(), "parsed CSV");
    rows
}

fn parse_row(header: &[&str], line: &str) -> RawRecord {
    let mut row = RawRecord::new();
    for (name, cell) in header.iter().zip(line.split(',')) {
        row.insert(*name, CellValue::coerce(cell));
    }
    row
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
