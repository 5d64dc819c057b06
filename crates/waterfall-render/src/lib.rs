//! # waterfall-render
//!
//! Gantt layout and rendering backends for waterfall charts.
//!
//! This crate provides:
//! - The layout engine turning a `NormalizedTaskSet` into a `GanttScene`
//! - Per-render assignee color allocation
//! - SVG rendering
//! - PNG rasterization (≈300 DPI by default)
//! - A plain-text table renderer for terminals
//!
//! ## Example
//!
//! ```rust,ignore
//! use waterfall_core::ColorTheme;
//! use waterfall_render::{plot_gantt, save_png, PngRenderer, DEFAULT_OUTPUT_PATH};
//!
//! let tasks = waterfall_parser::parse_tasks(&csv_text)?;
//! if let Some(png) = plot_gantt("Roadmap", &tasks, &ColorTheme::default(), &PngRenderer::new())? {
//!     save_png(&png, DEFAULT_OUTPUT_PATH.as_ref())?;
//! }
//! ```

pub mod layout;
pub mod palette;
pub mod raster;
pub mod svg_chart;

pub use layout::layout;
pub use palette::ColorAllocator;
pub use raster::{PngRenderer, RasterError};
pub use svg_chart::SvgRenderer;

use std::fmt::Write as _;
use std::path::Path;
use waterfall_core::{ColorTheme, GanttScene, NormalizedTaskSet, RenderError, Renderer};

/// Where the chart image is written when no path is configured
pub const DEFAULT_OUTPUT_PATH: &str = "/tmp/gantt.png";

/// Lay out and render a chart with a fresh color allocator.
///
/// Returns `Ok(None)` when `tasks` is empty: nothing was drawn and the caller
/// must not expect an artifact.
pub fn plot_gantt<R: Renderer>(
    title: &str,
    tasks: &NormalizedTaskSet,
    theme: &ColorTheme,
    renderer: &R,
) -> Result<Option<R::Output>, RenderError> {
    let mut colors = ColorAllocator::new();
    plot_gantt_with(title, tasks, theme, &mut colors, renderer)
}

/// Like [`plot_gantt`], drawing assignee colors from `colors`.
///
/// The allocator keeps its assignments afterwards; call
/// [`ColorAllocator::reset`] before reusing it for an unrelated chart.
pub fn plot_gantt_with<R: Renderer>(
    title: &str,
    tasks: &NormalizedTaskSet,
    theme: &ColorTheme,
    colors: &mut ColorAllocator,
    renderer: &R,
) -> Result<Option<R::Output>, RenderError> {
    let Some(scene) = layout(title, tasks, theme, colors) else {
        tracing::debug!(title, "no tasks, nothing rendered");
        return Ok(None);
    };
    renderer.render(&scene).map(Some)
}

/// Write a rendered image, creating parent directories as needed
pub fn save_png(bytes: &[u8], path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved chart");
    Ok(())
}

/// Plain text renderer for console output
#[derive(Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, scene: &GanttScene) -> Result<String, RenderError> {
        let name_width = scene
            .rows
            .iter()
            .map(|r| r.task.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);
        let who_width = scene
            .rows
            .iter()
            .map(|r| r.assignee.chars().count())
            .max()
            .unwrap_or(0)
            .max(8);

        let mut out = String::new();
        let _ = writeln!(out, "{} (from {})", scene.title, scene.origin);
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<who_width$}  {:>5}  {:>5}  {:>5}  {:>5}  severity",
            "task", "assignee", "start", "due", "lead", "delay"
        );
        for row in &scene.rows {
            let _ = writeln!(
                out,
                "{:<name_width$}  {:<who_width$}  {:>5}  {:>5}  {:>5}  {:>5}  {:?}",
                row.task,
                row.assignee,
                row.start_offset,
                row.due_offset,
                row.lead_span,
                row.delay_span,
                row.severity
            );
        }
        Ok(out)
    }
}
