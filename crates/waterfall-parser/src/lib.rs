//! # waterfall-parser
//!
//! Task ingestion for waterfall Gantt charts.
//!
//! This crate provides:
//! - A best-effort CSV reader producing loosely typed [`RawRecord`]s
//! - The normalizer turning [`TaskRecord`]s into a date-typed [`NormalizedTaskSet`]
//!
//! ## Example
//!
//! ```rust
//! use waterfall_parser::parse_tasks;
//!
//! let input = "task,assignee,start,due,end\n\
//!              Design,Alice,2021-01-10,2021-01-20,2021-01-25\n";
//!
//! let tasks = parse_tasks(input).unwrap();
//! assert_eq!(tasks.len(), 1);
//! assert_eq!(tasks.tasks()[0].assignee, "Alice");
//! ```

pub mod csv;
pub mod normalize;

pub use csv::parse_csv;
pub use normalize::{normalize, parse_date};

use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use waterfall_core::{NormalizeError, NormalizedTaskSet, RawRecord, TaskRecord};

/// Parsing error
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Read and parse a CSV file.
///
/// A missing file is reported and treated as "no data": the result is an
/// empty record list rather than an error.
pub fn parse_file(path: &Path) -> Result<Vec<RawRecord>, ParseError> {
    let content = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Invalid file address");
            return Ok(Vec::new());
        }
        Err(e) => return Err(ParseError::Io(e)),
    };

    let text = String::from_utf8(content)
        .map_err(|e| ParseError::InvalidValue(format!("{}: {}", path.display(), e)))?;
    Ok(parse_csv(&text))
}

/// Project raw CSV rows onto task records
pub fn task_records(rows: &[RawRecord]) -> Vec<TaskRecord> {
    rows.iter().map(RawRecord::to_task_record).collect()
}

/// CSV text straight to a normalized task set
pub fn parse_tasks(input: &str) -> Result<NormalizedTaskSet, ParseError> {
    let rows = parse_csv(input);
    Ok(normalize(&task_records(&rows))?)
}

/// CSV file straight to a normalized task set (missing file yields an empty set)
pub fn load_tasks(path: &Path) -> Result<NormalizedTaskSet, ParseError> {
    let rows = parse_file(path)?;
    Ok(normalize(&task_records(&rows))?)
}
