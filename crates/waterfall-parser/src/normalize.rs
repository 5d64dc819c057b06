//! Task record normalization
//!
//! Turns loosely typed [`TaskRecord`]s into a [`NormalizedTaskSet`] with
//! calendar dates. Any missing or unparseable date aborts the whole call.

use chrono::{NaiveDate, NaiveDateTime};
use waterfall_core::{
    DateField, NormalizeError, NormalizedTask, NormalizedTaskSet, TaskRecord,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Normalize task records, preserving input order.
///
/// Empty input yields an empty set. `task` and `assignee` are copied
/// verbatim (absent becomes the empty string).
pub fn normalize(rows: &[TaskRecord]) -> Result<NormalizedTaskSet, NormalizeError> {
    let tasks = rows
        .iter()
        .enumerate()
        .map(|(row, record)| normalize_record(row, record))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(tasks = tasks.len(), "normalized task records");
    Ok(NormalizedTaskSet::new(tasks))
}

fn normalize_record(row: usize, record: &TaskRecord) -> Result<NormalizedTask, NormalizeError> {
    let date = |field: DateField| -> Result<NaiveDate, NormalizeError> {
        let value = record
            .date_field(field)
            .ok_or(NormalizeError::MissingField { row, field })?;
        parse_date(value).ok_or_else(|| NormalizeError::MalformedDate {
            row,
            field,
            value: value.to_string(),
        })
    };

    Ok(NormalizedTask {
        task: record.task.clone().unwrap_or_default(),
        assignee: record.assignee.clone().unwrap_or_default(),
        start: date(DateField::Start)?,
        due: date(DateField::Due)?,
        end: date(DateField::End)?,
    })
}

/// Parse a calendar date; a time of day, if present, is discarded
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}
