//! Gantt layout engine
//!
//! Converts a [`NormalizedTaskSet`] into a [`GanttScene`]:
//!
//! 1. day offsets of every task relative to the earliest start
//! 2. lead span (start to due) and delay span (due to end)
//! 3. one color per assignee from the caller's [`ColorAllocator`]
//! 4. row slots in reverse declaration order, so the first task is drawn on
//!    top and later tasks stack below it
//! 5. bars, delay callouts, task labels, axis ticks and legend entries
//!
//! Negative spans never produce backwards bars. A task that ended before its
//! due date gets a zero-width delay bar and an "ahead" callout; a task whose
//! due date precedes its start gets a zero-width lead bar. The signed spans
//! stay on the [`LayoutRow`].

use chrono::{Duration, NaiveDate};
use waterfall_core::{
    BarKind, ColorTheme, DrawCommand, GanttScene, HAlign, LayoutRow, NormalizedTaskSet, Severity,
    TextStyle, TickKind, VAlign,
};

use crate::palette::ColorAllocator;

/// Days between labelled major ticks
pub const MAJOR_TICK_DAYS: i64 = 5;
/// Days between minor ticks
pub const MINOR_TICK_DAYS: i64 = 30;
/// Horizontal nudge of callouts and labels past the due date, in days
pub const LABEL_NUDGE: f64 = 0.1;

pub const LEAD_OPACITY: f32 = 1.0;
pub const DELAY_OPACITY: f32 = 0.5;
pub const LABEL_OPACITY: f32 = 0.8;

/// Upper bound on ticks of one kind; the step widens past this
pub const MAX_TICKS: i64 = 200;

/// Date format of major tick labels
pub const TICK_LABEL_FORMAT: &str = "%m/%d";

/// Lay out a chart. Returns `None` when there is nothing to draw.
///
/// Colors are taken from `colors`; the caller decides whether that allocator
/// is fresh for this chart or shared with related charts.
pub fn layout(
    title: &str,
    tasks: &NormalizedTaskSet,
    theme: &ColorTheme,
    colors: &mut ColorAllocator,
) -> Option<GanttScene> {
    let origin = tasks.min_start()?;
    let rows = layout_rows(tasks, origin, colors);
    let x_max = rows.iter().map(|r| r.end_offset).max().unwrap_or(0);
    let slots = rows.len();

    let mut commands = Vec::with_capacity(rows.len() * 4 + 16);
    commands.push(DrawCommand::Title {
        text: title.to_string(),
        color: theme.text,
    });

    // Display order: last-declared task in slot 0 (bottom)
    let display: Vec<(usize, &LayoutRow)> = rows.iter().rev().enumerate().collect();

    for (slot, row) in &display {
        commands.push(DrawCommand::Bar {
            slot: *slot,
            x: row.start_offset as f64,
            width: row.lead_span.max(0) as f64,
            color: row.color,
            opacity: LEAD_OPACITY,
            kind: BarKind::Lead,
        });
    }
    for (slot, row) in &display {
        commands.push(DrawCommand::Bar {
            slot: *slot,
            x: row.due_offset as f64,
            width: row.delay_span.max(0) as f64,
            color: row.color,
            opacity: DELAY_OPACITY,
            kind: BarKind::Delay,
        });
    }

    for (slot, row) in &display {
        let x = row.due_offset as f64 + LABEL_NUDGE;
        commands.push(DrawCommand::Text {
            slot: *slot,
            x,
            content: row.severity.callout(row.delay_span),
            style: TextStyle {
                color: row.severity.color(theme),
                bold: true,
                opacity: LABEL_OPACITY,
                h_align: HAlign::Left,
                v_align: VAlign::Top,
            },
        });
        commands.push(DrawCommand::Text {
            slot: *slot,
            x,
            content: row.task.clone(),
            style: TextStyle {
                color: theme.text,
                bold: true,
                opacity: LABEL_OPACITY,
                h_align: HAlign::Left,
                v_align: VAlign::Bottom,
            },
        });
    }

    for (x, label) in major_ticks(origin, x_max) {
        commands.push(DrawCommand::Tick {
            x: x as f64,
            kind: TickKind::Major,
            label: Some(label),
        });
    }
    for x in minor_ticks(x_max) {
        commands.push(DrawCommand::Tick {
            x: x as f64,
            kind: TickKind::Minor,
            label: None,
        });
    }

    let present = tasks.assignees();
    for (label, color) in colors.entries() {
        if present.contains(&label) {
            commands.push(DrawCommand::LegendEntry {
                label: label.to_string(),
                color,
            });
        }
    }

    tracing::debug!(
        tasks = slots,
        x_max,
        commands = commands.len(),
        "built gantt scene"
    );

    Some(GanttScene {
        title: title.to_string(),
        theme: theme.clone(),
        origin,
        x_max,
        slots,
        rows,
        commands,
    })
}

/// Per-task offsets, spans, colors and severity, in declaration order
pub fn layout_rows(
    tasks: &NormalizedTaskSet,
    origin: NaiveDate,
    colors: &mut ColorAllocator,
) -> Vec<LayoutRow> {
    tasks
        .iter()
        .map(|task| {
            let start_offset = (task.start - origin).num_days();
            let due_offset = (task.due - origin).num_days();
            let end_offset = (task.end - origin).num_days();
            let delay_span = end_offset - due_offset;
            LayoutRow {
                task: task.task.clone(),
                assignee: task.assignee.clone(),
                start_offset,
                due_offset,
                end_offset,
                lead_span: due_offset - start_offset,
                delay_span,
                color: colors.color_for(&task.assignee),
                severity: Severity::from_delay(delay_span),
            }
        })
        .collect()
}

/// Major ticks every [`MAJOR_TICK_DAYS`] over `0..=x_max`, labelled `%m/%d`.
///
/// Long ranges widen the step to a multiple of [`MAJOR_TICK_DAYS`] so that at
/// most [`MAX_TICKS`] are emitted.
pub fn major_ticks(origin: NaiveDate, x_max: i64) -> Vec<(i64, String)> {
    tick_positions(x_max, MAJOR_TICK_DAYS)
        .into_iter()
        .map(|x| {
            let date = origin + Duration::days(x);
            (x, date.format(TICK_LABEL_FORMAT).to_string())
        })
        .collect()
}

/// Unlabelled ticks every [`MINOR_TICK_DAYS`] over `0..=x_max`
pub fn minor_ticks(x_max: i64) -> Vec<i64> {
    tick_positions(x_max, MINOR_TICK_DAYS)
}

fn tick_positions(x_max: i64, step: i64) -> Vec<i64> {
    if x_max < 0 {
        return Vec::new();
    }
    (0..=x_max).step_by(tick_step(x_max, step) as usize).collect()
}

/// Smallest multiple of `base` keeping `0..=x_max` within [`MAX_TICKS`] ticks
fn tick_step(x_max: i64, base: i64) -> i64 {
    let needed = (x_max + MAX_TICKS - 2) / (MAX_TICKS - 1);
    let multiples = ((needed + base - 1) / base).max(1);
    base * multiples
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use waterfall_core::{NormalizedTask, Rgb};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn task(name: &str, who: &str, start: NaiveDate, due: NaiveDate, end: NaiveDate) -> NormalizedTask {
        NormalizedTask::new(name, who, start, due, end)
    }

    fn single() -> NormalizedTaskSet {
        NormalizedTaskSet::new(vec![task(
            "Task1",
            "Alice",
            date(2021, 1, 10),
            date(2021, 1, 20),
            date(2021, 1, 25),
        )])
    }

    fn three() -> NormalizedTaskSet {
        NormalizedTaskSet::new(vec![
            task("Scoping", "Alice", date(2021, 1, 10), date(2021, 1, 20), date(2021, 1, 25)),
            task("Build", "Bob", date(2021, 1, 15), date(2021, 2, 1), date(2021, 2, 10)),
            task("Test", "Alice", date(2021, 1, 25), date(2021, 2, 5), date(2021, 2, 25)),
        ])
    }

    #[test]
    fn single_task_offsets() {
        let mut colors = ColorAllocator::seeded(1);
        let rows = layout_rows(&single(), date(2021, 1, 10), &mut colors);
        let row = &rows[0];
        assert_eq!(row.start_offset, 0);
        assert_eq!(row.due_offset, 10);
        assert_eq!(row.lead_span, 10);
        assert_eq!(row.end_offset, 15);
        assert_eq!(row.delay_span, 5);
        assert_eq!(row.severity, Severity::Green);
    }

    #[test]
    fn offsets_are_relative_to_earliest_start() {
        let tasks = three();
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("Plan", &tasks, &ColorTheme::dark(), &mut colors).unwrap();

        assert_eq!(scene.origin, date(2021, 1, 10));
        assert!(scene.rows.iter().all(|r| r.start_offset >= 0));
        let starts: Vec<i64> = scene.rows.iter().map(|r| r.start_offset).collect();
        assert_eq!(starts, vec![0, 5, 15]);
        assert_eq!(scene.x_max, 46);
    }

    #[test]
    fn severity_of_each_row() {
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("Plan", &three(), &ColorTheme::dark(), &mut colors).unwrap();
        let buckets: Vec<Severity> = scene.rows.iter().map(|r| r.severity).collect();
        assert_eq!(buckets, vec![Severity::Green, Severity::Yellow, Severity::Red]);
    }

    #[test]
    fn empty_set_renders_nothing() {
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("Empty", &NormalizedTaskSet::default(), &ColorTheme::dark(), &mut colors);
        assert!(scene.is_none());
        assert!(colors.is_empty());
    }

    #[test]
    fn rows_are_reversed_into_slots() {
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("Plan", &three(), &ColorTheme::dark(), &mut colors).unwrap();

        let labels: Vec<(usize, String)> = scene
            .texts()
            .filter_map(|c| match c {
                DrawCommand::Text {
                    slot,
                    content,
                    style,
                    ..
                } if style.v_align == VAlign::Bottom => Some((*slot, content.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                (0, "Test".to_string()),
                (1, "Build".to_string()),
                (2, "Scoping".to_string()),
            ]
        );
    }

    #[test]
    fn two_bars_per_task() {
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("Plan", &three(), &ColorTheme::dark(), &mut colors).unwrap();

        let bars: Vec<(usize, f64, f64, f32, BarKind)> = scene
            .bars()
            .filter_map(|c| match c {
                DrawCommand::Bar {
                    slot,
                    x,
                    width,
                    opacity,
                    kind,
                    ..
                } => Some((*slot, *x, *width, *opacity, *kind)),
                _ => None,
            })
            .collect();

        assert_eq!(bars.len(), 6);
        // Scoping sits in the top slot
        assert!(bars.contains(&(2, 0.0, 10.0, LEAD_OPACITY, BarKind::Lead)));
        assert!(bars.contains(&(2, 10.0, 5.0, DELAY_OPACITY, BarKind::Delay)));
        assert!(bars.contains(&(0, 26.0, 20.0, DELAY_OPACITY, BarKind::Delay)));
    }

    #[test]
    fn same_assignee_shares_color() {
        let mut colors = ColorAllocator::seeded(9);
        let scene = layout("Plan", &three(), &ColorTheme::dark(), &mut colors).unwrap();
        assert_eq!(scene.rows[0].color, scene.rows[2].color);
        assert_eq!(Some(scene.rows[0].color), colors.get("Alice"));
    }

    #[test]
    fn callouts_use_severity_colors() {
        let theme = ColorTheme::dark();
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("Plan", &three(), &theme, &mut colors).unwrap();

        let callouts: Vec<(String, Rgb, f64)> = scene
            .texts()
            .filter_map(|c| match c {
                DrawCommand::Text {
                    content, style, x, ..
                } if style.v_align == VAlign::Top => Some((content.clone(), style.color, *x)),
                _ => None,
            })
            .collect();

        assert!(callouts.contains(&("(delay: 5days)".into(), theme.green, 10.1)));
        assert!(callouts.contains(&("(delay: 9days)".into(), theme.yellow, 22.1)));
        assert!(callouts.contains(&("(delay: 20days)".into(), theme.red, 26.1)));
    }

    #[test]
    fn early_finish_is_clamped_and_marked_ahead() {
        let tasks = NormalizedTaskSet::new(vec![task(
            "Quick",
            "Alice",
            date(2021, 1, 10),
            date(2021, 1, 20),
            date(2021, 1, 17),
        )]);
        let theme = ColorTheme::dark();
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("Plan", &tasks, &theme, &mut colors).unwrap();

        assert_eq!(scene.rows[0].delay_span, -3);
        assert_eq!(scene.rows[0].severity, Severity::Ahead);

        let delay_width = scene.bars().find_map(|c| match c {
            DrawCommand::Bar {
                kind: BarKind::Delay,
                width,
                ..
            } => Some(*width),
            _ => None,
        });
        assert_eq!(delay_width, Some(0.0));

        let ahead = scene.texts().any(|c| {
            matches!(c, DrawCommand::Text { content, style, .. }
                if content == "(ahead: 3days)" && style.color == theme.blue)
        });
        assert!(ahead);
    }

    #[test]
    fn tick_spacing() {
        let origin = date(2021, 1, 10);
        let major = major_ticks(origin, 46);
        let xs: Vec<i64> = major.iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![0, 5, 10, 15, 20, 25, 30, 35, 40, 45]);
        assert_eq!(major[0].1, "01/10");
        assert_eq!(major[5].1, "02/04");

        assert_eq!(minor_ticks(46), vec![0, 30]);
        assert_eq!(minor_ticks(0), vec![0]);
        assert!(minor_ticks(-1).is_empty());
    }

    #[test]
    fn long_ranges_widen_the_tick_step() {
        let origin = date(1990, 1, 1);
        let x_max = 36_500;
        let major = major_ticks(origin, x_max);
        let minor = minor_ticks(x_max);

        assert!(major.len() as i64 <= MAX_TICKS, "{} major ticks", major.len());
        assert!(minor.len() as i64 <= MAX_TICKS, "{} minor ticks", minor.len());
        assert!(major.iter().all(|(x, _)| x % MAJOR_TICK_DAYS == 0));
        assert!(minor.iter().all(|x| x % MINOR_TICK_DAYS == 0));
        assert_eq!(major[0], (0, "01/01".to_string()));
    }

    #[test]
    fn tick_step_boundaries() {
        // 199 steps of 5 days is exactly 200 ticks
        assert_eq!(tick_step(995, MAJOR_TICK_DAYS), 5);
        assert_eq!(major_ticks(date(2021, 1, 1), 995).len(), 200);
        assert_eq!(tick_step(996, MAJOR_TICK_DAYS), 10);
        assert_eq!(tick_step(0, MINOR_TICK_DAYS), 30);
    }

    #[test]
    fn due_before_start_gets_zero_width_lead_bar() {
        let tasks = NormalizedTaskSet::new(vec![
            task("Kickoff", "Alice", date(2021, 1, 10), date(2021, 1, 20), date(2021, 1, 25)),
            task("Backdated", "Bob", date(2021, 1, 15), date(2021, 1, 12), date(2021, 1, 18)),
        ]);
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("Plan", &tasks, &ColorTheme::dark(), &mut colors).unwrap();

        assert_eq!(scene.rows[1].lead_span, -3);
        assert_eq!(scene.rows[1].delay_span, 6);

        let bars: Vec<(usize, f64, f64, BarKind)> = scene
            .bars()
            .filter_map(|c| match c {
                DrawCommand::Bar {
                    slot, x, width, kind, ..
                } => Some((*slot, *x, *width, *kind)),
                _ => None,
            })
            .collect();
        assert!(bars.iter().all(|(_, _, width, _)| *width >= 0.0));
        // Backdated is the last task, so it sits in slot 0
        assert!(bars.contains(&(0, 5.0, 0.0, BarKind::Lead)));
        assert!(bars.contains(&(0, 2.0, 6.0, BarKind::Delay)));
    }

    #[test]
    fn ticks_land_in_scene() {
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("One", &single(), &ColorTheme::dark(), &mut colors).unwrap();

        let labels: Vec<String> = scene
            .ticks()
            .filter_map(|c| match c {
                DrawCommand::Tick {
                    kind: TickKind::Major,
                    label: Some(label),
                    ..
                } => Some(label.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["01/10", "01/15", "01/20", "01/25"]);
    }

    #[test]
    fn legend_lists_present_assignees_in_allocation_order() {
        let mut colors = ColorAllocator::seeded(2);
        colors.color_for("Zed");
        let scene = layout("Plan", &three(), &ColorTheme::dark(), &mut colors).unwrap();

        let legend: Vec<&str> = scene.legend().into_iter().map(|(name, _)| name).collect();
        assert_eq!(legend, vec!["Alice", "Bob"]);
    }

    #[test]
    fn title_is_first_command() {
        let theme = ColorTheme::dark();
        let mut colors = ColorAllocator::seeded(1);
        let scene = layout("Roadmap", &single(), &theme, &mut colors).unwrap();
        assert_eq!(
            scene.commands[0],
            DrawCommand::Title {
                text: "Roadmap".into(),
                color: theme.text
            }
        );
        assert_eq!(scene.title_text(), Some("Roadmap"));
    }
}
