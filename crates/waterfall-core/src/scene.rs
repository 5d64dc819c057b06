//! Drawing primitives produced by the layout engine
//!
//! A [`GanttScene`] is a backend-independent description of a chart: the
//! numeric layout of every task plus an ordered list of [`DrawCommand`]s.
//! X coordinates are day offsets from the earliest task start; Y positions
//! are row slots counted from the bottom of the plot (slot 0 is the lowest
//! bar).

use crate::{ColorTheme, Rgb};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Delay classification used to color the callout next to each task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Finished before the due date (negative delay)
    Ahead,
    /// Less than a week late
    Green,
    /// Less than two weeks late
    Yellow,
    /// Two weeks or more
    Red,
}

impl Severity {
    pub fn from_delay(delay_days: i64) -> Self {
        if delay_days < 0 {
            Severity::Ahead
        } else if delay_days < 7 {
            Severity::Green
        } else if delay_days < 14 {
            Severity::Yellow
        } else {
            Severity::Red
        }
    }

    /// Theme color for the callout text
    pub fn color(&self, theme: &ColorTheme) -> Rgb {
        match self {
            Severity::Ahead => theme.blue,
            Severity::Green => theme.green,
            Severity::Yellow => theme.yellow,
            Severity::Red => theme.red,
        }
    }

    /// Callout text, e.g. `(delay: 5days)` or `(ahead: 2days)`
    pub fn callout(&self, delay_days: i64) -> String {
        match self {
            Severity::Ahead => format!("(ahead: {}days)", -delay_days),
            _ => format!("(delay: {}days)", delay_days),
        }
    }
}

/// Numeric layout of one task, in declaration order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRow {
    pub task: String,
    pub assignee: String,
    pub start_offset: i64,
    pub due_offset: i64,
    pub end_offset: i64,
    /// `due_offset - start_offset`
    pub lead_span: i64,
    /// `end_offset - due_offset`, negative when the task finished early
    pub delay_span: i64,
    pub color: Rgb,
    pub severity: Severity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarKind {
    /// Start to due date
    Lead,
    /// Due date to actual end
    Delay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    /// Text hangs below the anchor point
    Top,
    Center,
    /// Text sits on the anchor point
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Rgb,
    pub bold: bool,
    pub opacity: f32,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickKind {
    Major,
    Minor,
}

/// A single drawing primitive
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Chart heading
    Title { text: String, color: Rgb },
    /// Horizontal bar in a row slot, `x` and `width` in days
    Bar {
        slot: usize,
        x: f64,
        width: f64,
        color: Rgb,
        opacity: f32,
        kind: BarKind,
    },
    /// Text anchored at (`x`, row slot center)
    Text {
        slot: usize,
        x: f64,
        content: String,
        style: TextStyle,
    },
    /// X-axis tick with its grid line
    Tick {
        x: f64,
        kind: TickKind,
        label: Option<String>,
    },
    LegendEntry { label: String, color: Rgb },
}

/// Fully laid-out Gantt chart, ready for a [`crate::Renderer`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GanttScene {
    pub title: String,
    pub theme: ColorTheme,
    /// Earliest task start; day offset 0
    pub origin: NaiveDate,
    /// Right edge of the x range, in days
    pub x_max: i64,
    /// Number of row slots (one per task)
    pub slots: usize,
    /// Per-task layout in declaration order
    pub rows: Vec<LayoutRow>,
    pub commands: Vec<DrawCommand>,
}

impl GanttScene {
    pub fn title_text(&self) -> Option<&str> {
        self.commands.iter().find_map(|c| match c {
            DrawCommand::Title { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn bars(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Bar { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. }))
    }

    pub fn ticks(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Tick { .. }))
    }

    /// Legend entries as (label, color) in allocation order
    pub fn legend(&self) -> Vec<(&str, Rgb)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::LegendEntry { label, color } => Some((label.as_str(), *color)),
                _ => None,
            })
            .collect()
    }
}
