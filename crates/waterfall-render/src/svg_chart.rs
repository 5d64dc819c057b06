//! SVG backend
//!
//! Draws a [`GanttScene`] as a standalone SVG document: centered title, the
//! bar area with dashed day grid, a date axis along the bottom and a legend
//! of up to [`SvgRenderer::legend_columns`] entries per line underneath.
//!
//! The canvas is sized to its content: labels running past the last day or
//! left of the first one widen it. Text extents are estimated from the font
//! size, since no font metrics are available before rasterization.

use svg::node::element::{Group, Line, Rectangle, Text};
use svg::Document;
use waterfall_core::{
    DrawCommand, GanttScene, HAlign, RenderError, Renderer, Rgb, TextStyle, TickKind, VAlign,
};

/// SVG Gantt chart renderer configuration
#[derive(Clone, Debug)]
pub struct SvgRenderer {
    /// Width of the bar area in pixels
    pub chart_width: u32,
    /// Height per task row in pixels
    pub row_height: u32,
    /// Height reserved for the title
    pub title_height: u32,
    /// Height of the date axis below the bars
    pub axis_height: u32,
    /// Height per legend line
    pub legend_row_height: u32,
    /// Legend entries per line
    pub legend_columns: usize,
    /// Padding around the chart
    pub padding: u32,
    /// Font family
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            chart_width: 1200,
            row_height: 36,
            title_height: 44,
            axis_height: 32,
            legend_row_height: 26,
            legend_columns: 5,
            padding: 20,
            font_family: "DejaVu Sans, Arial, sans-serif".into(),
            font_size: 12,
        }
    }
}

/// Average advance of a glyph, as a fraction of the font size
const GLYPH_WIDTH: f64 = 0.62;
const BOLD_GLYPH_WIDTH: f64 = 0.7;
const LEGEND_SWATCH: f64 = 14.0;
const LEGEND_GAP: f64 = 6.0;

/// Pixel geometry of one scene
struct Frame {
    /// Canvas width
    width: f64,
    /// X of day 0
    left: f64,
    chart_top: f64,
    chart_bottom: f64,
    px_per_day: f64,
    slots: usize,
    row_height: f64,
}

impl Frame {
    fn x(&self, day: f64) -> f64 {
        self.left + day * self.px_per_day
    }

    /// Vertical center of a row slot; slot 0 is the bottom row
    fn slot_center(&self, slot: usize) -> f64 {
        let from_top = self.slots.saturating_sub(slot + 1) as f64;
        self.chart_top + from_top * self.row_height + self.row_height / 2.0
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure chart width
    pub fn chart_width(mut self, width: u32) -> Self {
        self.chart_width = width;
        self
    }

    /// Configure row height
    pub fn row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    /// Configure font family
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Estimated rendered width of a text run
    fn text_width(&self, content: &str, bold: bool, font_size: u32) -> f64 {
        let glyph = if bold { BOLD_GLYPH_WIDTH } else { GLYPH_WIDTH };
        content.chars().count() as f64 * glyph * font_size as f64
    }

    /// Horizontal span of a text run anchored at `x`
    fn text_span(&self, x: f64, width: f64, align: HAlign) -> (f64, f64) {
        match align {
            HAlign::Left => (x, x + width),
            HAlign::Center => (x - width / 2.0, x + width / 2.0),
            HAlign::Right => (x - width, x),
        }
    }

    /// Top-left corner of legend entry `index` of `count`, relative to day 0
    fn legend_position(&self, index: usize, count: usize, top: f64) -> (f64, f64) {
        let columns = self.legend_columns.max(1);
        let column_width = self.chart_width as f64 / columns as f64;
        let line = index / columns;
        let in_line = (count - line * columns).min(columns);
        let line_left = (self.chart_width as f64 - in_line as f64 * column_width) / 2.0;
        let x = line_left + (index % columns) as f64 * column_width;
        (x, top + line as f64 * self.legend_row_height as f64)
    }

    /// Leftmost and rightmost drawn x relative to day 0, covering at least
    /// the bar area
    fn content_extent(&self, scene: &GanttScene, px_per_day: f64) -> (f64, f64) {
        let mut min_x: f64 = 0.0;
        let mut max_x = self.chart_width as f64;
        let mut include = |from: f64, to: f64| {
            min_x = min_x.min(from);
            max_x = max_x.max(to);
        };

        for command in &scene.commands {
            match command {
                DrawCommand::Bar { x, width, .. } => {
                    include(x * px_per_day, (x + width.max(0.0)) * px_per_day);
                }
                DrawCommand::Text { x, content, style, .. } => {
                    let width = self.text_width(content, style.bold, self.font_size);
                    let (from, to) = self.text_span(x * px_per_day, width, style.h_align);
                    include(from, to);
                }
                DrawCommand::Tick { x, label: Some(label), .. } => {
                    let width = self.text_width(label, false, self.font_size);
                    let (from, to) = self.text_span(x * px_per_day, width, HAlign::Center);
                    include(from, to);
                }
                DrawCommand::Tick { .. } | DrawCommand::Title { .. } | DrawCommand::LegendEntry { .. } => {}
            }
        }

        let legend = scene.legend();
        for (i, (label, _)) in legend.iter().enumerate() {
            let (x, _) = self.legend_position(i, legend.len(), 0.0);
            let width = self.text_width(label, true, self.font_size);
            include(x, x + LEGEND_SWATCH + LEGEND_GAP + width);
        }
        (min_x, max_x)
    }

    fn legend_lines(&self, entries: usize) -> u32 {
        let columns = self.legend_columns.max(1);
        entries.div_ceil(columns) as u32
    }

    /// Calculate the total height based on task and legend counts
    fn total_height(&self, slots: usize, legend_entries: usize) -> u32 {
        self.padding * 2
            + self.title_height
            + slots as u32 * self.row_height
            + self.axis_height
            + self.legend_lines(legend_entries) * self.legend_row_height
    }

    fn frame(&self, scene: &GanttScene) -> Frame {
        let chart_top = (self.padding + self.title_height) as f64;
        let row_height = self.row_height as f64;
        let px_per_day = self.chart_width as f64 / scene.x_max.max(1) as f64;
        let padding = self.padding as f64;

        let (min_x, max_x) = self.content_extent(scene, px_per_day);
        let left = padding - min_x;
        let title = self.text_width(&scene.title, true, self.font_size + 3);
        let width = (left + max_x + padding).max(title + 2.0 * padding).ceil();

        Frame {
            width,
            left,
            chart_top,
            chart_bottom: chart_top + scene.slots as f64 * row_height,
            px_per_day,
            slots: scene.slots,
            row_height,
        }
    }

    fn text(&self, content: &str, x: f64, y: f64, style: &TextStyle) -> Text {
        let anchor = match style.h_align {
            HAlign::Left => "start",
            HAlign::Center => "middle",
            HAlign::Right => "end",
        };
        let baseline = match style.v_align {
            VAlign::Top => "hanging",
            VAlign::Center => "central",
            VAlign::Bottom => "alphabetic",
        };
        let mut text = Text::new(content)
            .set("x", x)
            .set("y", y)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
            .set("fill", style.color.to_hex())
            .set("fill-opacity", style.opacity)
            .set("text-anchor", anchor)
            .set("dominant-baseline", baseline);
        if style.bold {
            text = text.set("font-weight", "bold");
        }
        text
    }

    fn render_title(&self, text: &str, color: Rgb, width: f64) -> Text {
        Text::new(text)
            .set("x", width / 2.0)
            .set("y", self.padding + self.title_height / 2)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size + 3)
            .set("font-weight", "bold")
            .set("fill", color.to_hex())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
    }

    /// Dashed grid line plus axis mark and label for one tick
    fn render_tick(
        &self,
        frame: &Frame,
        x: f64,
        kind: TickKind,
        label: Option<&str>,
        axis: Rgb,
    ) -> Group {
        let mut group = Group::new().set(
            "class",
            match kind {
                TickKind::Major => "tick major",
                TickKind::Minor => "tick minor",
            },
        );
        let px = frame.x(x);

        let grid = Line::new()
            .set("x1", px)
            .set("y1", frame.chart_top)
            .set("x2", px)
            .set("y2", frame.chart_bottom)
            .set("stroke", axis.to_hex())
            .set("stroke-opacity", 0.4)
            .set("stroke-dasharray", "4 3")
            .set("stroke-width", 1);
        group = group.add(grid);

        let mark_len = match kind {
            TickKind::Major => 6.0,
            TickKind::Minor => 3.0,
        };
        let mark = Line::new()
            .set("x1", px)
            .set("y1", frame.chart_bottom)
            .set("x2", px)
            .set("y2", frame.chart_bottom + mark_len)
            .set("stroke", axis.to_hex())
            .set("stroke-width", 1);
        group = group.add(mark);

        if let Some(label) = label {
            let style = TextStyle {
                color: axis,
                bold: false,
                opacity: 1.0,
                h_align: HAlign::Center,
                v_align: VAlign::Top,
            };
            group = group.add(self.text(label, px, frame.chart_bottom + mark_len + 3.0, &style));
        }
        group
    }

    fn render_legend(&self, frame: &Frame, entries: &[(&str, Rgb)], top: f64, text: Rgb) -> Group {
        let mut group = Group::new().set("class", "legend");
        let box_size = LEGEND_SWATCH;

        for (i, (label, color)) in entries.iter().enumerate() {
            let (dx, y) = self.legend_position(i, entries.len(), top);
            let x = frame.left + dx;

            let swatch = Rectangle::new()
                .set("x", x)
                .set("y", y)
                .set("width", box_size)
                .set("height", box_size)
                .set("rx", 2)
                .set("fill", color.to_hex());
            group = group.add(swatch);

            let style = TextStyle {
                color: text,
                bold: true,
                opacity: 1.0,
                h_align: HAlign::Left,
                v_align: VAlign::Center,
            };
            group = group.add(self.text(label, x + box_size + LEGEND_GAP, y + box_size / 2.0, &style));
        }
        group
    }
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&self, scene: &GanttScene) -> Result<String, RenderError> {
        if scene.slots == 0 {
            return Err(RenderError::InvalidData("No tasks to render".into()));
        }

        let frame = self.frame(scene);
        let legend = scene.legend();
        let width = frame.width;
        let height = self.total_height(scene.slots, legend.len());
        let theme = &scene.theme;

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        let background = Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", theme.bg.to_hex());
        document = document.add(background);

        // Grid sits below the bars
        let mut grid = Group::new().set("class", "grid");
        let mut bars = Group::new().set("class", "bars");
        let mut labels = Group::new().set("class", "labels");
        let bar_height = frame.row_height * 0.8;

        for command in &scene.commands {
            match command {
                DrawCommand::Title { text, color } => {
                    document = document.add(self.render_title(text, *color, width));
                }
                DrawCommand::Tick { x, kind, label } => {
                    grid = grid.add(self.render_tick(&frame, *x, *kind, label.as_deref(), theme.white));
                }
                DrawCommand::Bar {
                    slot,
                    x,
                    width: days,
                    color,
                    opacity,
                    ..
                } => {
                    let bar = Rectangle::new()
                        .set("x", frame.x(*x))
                        .set("y", frame.slot_center(*slot) - bar_height / 2.0)
                        .set("width", days.max(0.0) * frame.px_per_day)
                        .set("height", bar_height)
                        .set("fill", color.to_hex())
                        .set("fill-opacity", *opacity);
                    bars = bars.add(bar);
                }
                DrawCommand::Text {
                    slot,
                    x,
                    content,
                    style,
                } => {
                    labels = labels.add(self.text(content, frame.x(*x), frame.slot_center(*slot), style));
                }
                DrawCommand::LegendEntry { .. } => {}
            }
        }

        let axis = Line::new()
            .set("x1", frame.left)
            .set("y1", frame.chart_bottom)
            .set("x2", frame.left + self.chart_width as f64)
            .set("y2", frame.chart_bottom)
            .set("stroke", theme.white.to_hex())
            .set("stroke-width", 1);

        document = document.add(grid).add(axis).add(bars).add(labels);

        if !legend.is_empty() {
            let legend_top = frame.chart_bottom + self.axis_height as f64;
            document = document.add(self.render_legend(&frame, &legend, legend_top, theme.text));
        }

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }
}
