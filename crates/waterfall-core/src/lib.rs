//! # waterfall-core
//!
//! Core task model and traits for waterfall Gantt charts.
//!
//! This crate provides:
//! - Ingestion types: `CellValue`, `RawRecord`, `TaskRecord`
//! - The date-typed task set: `NormalizedTask`, `NormalizedTaskSet`
//! - Drawing primitives emitted by the layout engine: `GanttScene`, `DrawCommand`
//! - Color theme handling: `ColorTheme`, `Rgb`
//! - The `Renderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use waterfall_core::{CellValue, TaskRecord};
//!
//! assert_eq!(CellValue::coerce("42"), CellValue::Integer(42));
//! assert_eq!(CellValue::coerce(""), CellValue::Null);
//!
//! let record = TaskRecord::new("Design", "Alice", "2021-01-10", "2021-01-20", "2021-01-25");
//! assert_eq!(record.assignee.as_deref(), Some("Alice"));
//! ```

pub mod scene;
pub mod theme;

pub use scene::{
    BarKind, DrawCommand, GanttScene, HAlign, LayoutRow, Severity, TextStyle, TickKind, VAlign,
};
pub use theme::{ColorTheme, Rgb, ThemeError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Raw ingestion
// ============================================================================

/// A single loosely-typed CSV cell
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Text(String),
    Null,
}

impl CellValue {
    /// Best-effort typing of a raw cell.
    ///
    /// Digits-only cells become `Integer`, empty cells become `Null`,
    /// everything else is kept as `Text`. A digit run too large for `i64`
    /// stays `Text`.
    pub fn coerce(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Null;
        }
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return CellValue::Integer(n);
            }
        }
        CellValue::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// String form of the cell, `None` for `Null`
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Integer(n) => Some(n.to_string()),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Null => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Null => Ok(()),
        }
    }
}

/// One parsed CSV data row: header name to cell, in header order.
///
/// Fields past the end of a ragged row are absent rather than `Null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: Vec<(String, CellValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an earlier value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Builder-style `insert`
    pub fn with(mut self, name: impl Into<String>, value: CellValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Project onto the five task fields. `Null` and absent cells become `None`.
    pub fn to_task_record(&self) -> TaskRecord {
        let text = |name: &str| self.get(name).and_then(CellValue::to_text);
        TaskRecord {
            task: text("task"),
            assignee: text("assignee"),
            start: text("start"),
            due: text("due"),
            end: text("end"),
        }
    }
}

/// A task row before date parsing. Any field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task: Option<String>,
    pub assignee: Option<String>,
    pub start: Option<String>,
    pub due: Option<String>,
    pub end: Option<String>,
}

impl TaskRecord {
    /// Fully populated record
    pub fn new(
        task: impl Into<String>,
        assignee: impl Into<String>,
        start: impl Into<String>,
        due: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            task: Some(task.into()),
            assignee: Some(assignee.into()),
            start: Some(start.into()),
            due: Some(due.into()),
            end: Some(end.into()),
        }
    }

    /// Raw value of one of the date fields
    pub fn date_field(&self, field: DateField) -> Option<&str> {
        match field {
            DateField::Start => self.start.as_deref(),
            DateField::Due => self.due.as_deref(),
            DateField::End => self.end.as_deref(),
        }
    }
}

impl From<&RawRecord> for TaskRecord {
    fn from(record: &RawRecord) -> Self {
        record.to_task_record()
    }
}

// ============================================================================
// Normalized tasks
// ============================================================================

/// The three calendar fields of a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    Start,
    Due,
    End,
}

impl DateField {
    pub const ALL: [DateField; 3] = [DateField::Start, DateField::Due, DateField::End];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::Start => "start",
            DateField::Due => "due",
            DateField::End => "end",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task with parsed calendar dates
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTask {
    pub task: String,
    pub assignee: String,
    pub start: NaiveDate,
    pub due: NaiveDate,
    pub end: NaiveDate,
}

impl NormalizedTask {
    pub fn new(
        task: impl Into<String>,
        assignee: impl Into<String>,
        start: NaiveDate,
        due: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            task: task.into(),
            assignee: assignee.into(),
            start,
            due,
            end,
        }
    }

    /// Whether `start <= due <= end`. Out-of-order tasks still render.
    pub fn is_ordered(&self) -> bool {
        self.start <= self.due && self.due <= self.end
    }
}

/// Ordered, read-only set of normalized tasks (input row order)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTaskSet {
    tasks: Vec<NormalizedTask>,
}

impl NormalizedTaskSet {
    pub fn new(tasks: Vec<NormalizedTask>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[NormalizedTask] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedTask> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Earliest start date, `None` for an empty set
    pub fn min_start(&self) -> Option<NaiveDate> {
        self.tasks.iter().map(|t| t.start).min()
    }

    /// Latest end date, `None` for an empty set
    pub fn max_end(&self) -> Option<NaiveDate> {
        self.tasks.iter().map(|t| t.end).max()
    }

    /// Distinct assignees in first-seen order
    pub fn assignees(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if !seen.contains(&task.assignee.as_str()) {
                seen.push(task.assignee.as_str());
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a NormalizedTaskSet {
    type Item = &'a NormalizedTask;
    type IntoIter = std::slice::Iter<'a, NormalizedTask>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

impl FromIterator<NormalizedTask> for NormalizedTaskSet {
    fn from_iter<I: IntoIterator<Item = NormalizedTask>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Backend that turns a laid-out scene into an output artifact
pub trait Renderer {
    type Output;

    /// Render a scene to the output format
    fn render(&self, scene: &GanttScene) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Failure while turning task records into a `NormalizedTaskSet`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Malformed {field} date in row {row}: {value:?}")]
    MalformedDate {
        row: usize,
        field: DateField,
        value: String,
    },

    #[error("Missing {field} date in row {row}")]
    MissingField { row: usize, field: DateField },
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Raster error: {0}")]
    Raster(String),
}
