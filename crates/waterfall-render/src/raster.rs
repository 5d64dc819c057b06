//! PNG backend
//!
//! Renders the scene through [`SvgRenderer`] and rasterizes the document with
//! `usvg`/`resvg` onto a `tiny-skia` pixmap filled with the theme background.
//! SVG user units are treated as 96 DPI, so the default 300 DPI output is
//! scaled by 300/96.

use crate::svg_chart::SvgRenderer;
use thiserror::Error;
use waterfall_core::{GanttScene, RenderError, Renderer, Rgb};

/// Resolution SVG user units are defined at
pub const SVG_DPI: f32 = 96.0;
/// Default output resolution
pub const DEFAULT_DPI: f32 = 300.0;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("failed to parse SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),
    #[error("invalid DPI {0}")]
    InvalidDpi(f32),
}

impl From<RasterError> for RenderError {
    fn from(e: RasterError) -> Self {
        RenderError::Raster(e.to_string())
    }
}

/// PNG Gantt chart renderer
#[derive(Clone, Debug)]
pub struct PngRenderer {
    pub svg: SvgRenderer,
    /// Output resolution in dots per inch
    pub dpi: f32,
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self {
            svg: SvgRenderer::default(),
            dpi: DEFAULT_DPI,
        }
    }
}

impl PngRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn svg_renderer(mut self, svg: SvgRenderer) -> Self {
        self.svg = svg;
        self
    }

    pub fn scale(&self) -> f32 {
        self.dpi / SVG_DPI
    }
}

impl Renderer for PngRenderer {
    type Output = Vec<u8>;

    fn render(&self, scene: &GanttScene) -> Result<Vec<u8>, RenderError> {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(RasterError::InvalidDpi(self.dpi).into());
        }
        let svg = self.svg.render(scene)?;
        let png = svg_to_png(&svg, self.scale(), scene.theme.bg)?;
        tracing::debug!(bytes = png.len(), dpi = self.dpi, "rasterized gantt chart");
        Ok(png)
    }
}

/// Rasterize an SVG document at `scale`, filling `background` first
pub fn svg_to_png(svg: &str, scale: f32, background: Rgb) -> Result<Vec<u8>, RasterError> {
    let pixmap = svg_to_pixmap(svg, scale, background)?;
    pixmap
        .encode_png()
        .map_err(|e| RasterError::PngEncode(e.to_string()))
}

fn svg_to_pixmap(
    svg: &str,
    scale: f32,
    background: Rgb,
) -> Result<tiny_skia::Pixmap, RasterError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|e| RasterError::SvgParse(e.to_string()))?;

    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RasterError::PixmapAlloc { width, height })?;
    pixmap.fill(tiny_skia::Color::from_rgba8(
        background.r,
        background.g,
        background.b,
        255,
    ));

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}
