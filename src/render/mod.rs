//! Render targets and the drawing surface abstraction.
//!
//! The same pipeline draws the interactive canvas (through an egui painter),
//! the print page and the raster export (both through an SVG surface that is
//! rasterized afterwards). Everything target-specific lives in a
//! [`RenderTarget`] value passed into each render call.

mod icons;
mod legend;
mod svg;

pub use icons::{draw_arrowhead, draw_icon};
pub use legend::LegendLayout;
pub use svg::{rasterize, SvgSurface};

use crate::constants::SCREEN_DPI;
use crate::coords::DeviceTransform;
use crate::types::{FontSpec, FontStyle};
use crate::zoom::DerivedSizes;
use eframe::egui;

/// The kind of output being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Interactive on-screen canvas
    InteractiveView,
    /// Single full-scale print page
    FullPrint,
    /// Raster image export
    RasterExport,
}

/// Everything the pipeline needs to know about the active output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    /// Which output this is
    pub kind: TargetKind,
    /// Drawing area in device units
    pub device: egui::Rect,
    /// Physical pixels per inch
    pub dpi: f32,
    /// Physical pixels per device unit (egui `pixels_per_point` on screen, 1 elsewhere)
    pub pixels_per_unit: f32,
    /// Multiplier applied to derived font sizes
    pub font_multiplier: f32,
    /// Multiplier applied to derived line thickness
    pub line_multiplier: f32,
    /// Whether shapes are anti-aliased
    pub antialias: bool,
}

impl RenderTarget {
    /// Interactive canvas; `dpi` is device units per inch.
    pub fn interactive(device: egui::Rect, dpi: f32) -> Self {
        Self {
            kind: TargetKind::InteractiveView,
            device,
            dpi,
            pixels_per_unit: 1.0,
            font_multiplier: 1.0,
            line_multiplier: 1.0,
            antialias: true,
        }
    }

    /// Print page drawing area at `dpi`.
    pub fn full_print(device: egui::Rect, dpi: f32) -> Self {
        Self {
            kind: TargetKind::FullPrint,
            device,
            dpi,
            pixels_per_unit: 1.0,
            font_multiplier: 1.0,
            line_multiplier: 1.0,
            antialias: true,
        }
    }

    /// Raster export canvas at `dpi`.
    pub fn raster_export(device: egui::Rect, dpi: f32) -> Self {
        Self {
            kind: TargetKind::RasterExport,
            device,
            dpi,
            pixels_per_unit: 1.0,
            font_multiplier: 1.0,
            line_multiplier: 1.0,
            antialias: true,
        }
    }

    /// Whether this is the interactive canvas.
    pub fn is_interactive(&self) -> bool {
        self.kind == TargetKind::InteractiveView
    }
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::interactive(
            egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0)),
            SCREEN_DPI,
        )
    }
}

/// Stroke pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineDash {
    /// Continuous
    #[default]
    Solid,
    /// Dashes a few line widths long
    Dashed,
    /// Dots
    Dotted,
}

/// Font request in toolkit units.
#[derive(Debug, Clone, PartialEq)]
pub struct FontRequest {
    /// Family name
    pub family: String,
    /// Weight/slant
    pub style: FontStyle,
    /// Size in toolkit units
    pub size: f32,
}

impl FontRequest {
    /// Builds a request for `spec` at the given size.
    pub fn new(spec: &FontSpec, size: f32) -> Self {
        Self {
            family: spec.name.clone(),
            style: spec.style,
            size,
        }
    }

    /// Default family at the given size.
    pub fn sized(size: f32) -> Self {
        Self::new(&FontSpec::default(), size)
    }

    /// Whether the family names a fixed-pitch font.
    pub fn is_monospace(&self) -> bool {
        let f = self.family.to_ascii_lowercase();
        f.contains("mono") || f.contains("courier")
    }
}

/// Measures text extents in toolkit units.
pub trait TextMeasure {
    /// Width and height of `text` (which may contain newlines).
    fn measure(&self, text: &str, font: &FontRequest) -> egui::Vec2;
}

/// Size estimate from average glyph proportions, for headless use without fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl TextMeasure for EstimatedMetrics {
    fn measure(&self, text: &str, font: &FontRequest) -> egui::Vec2 {
        let advance = if font.is_monospace() { 0.6 } else { 0.55 };
        let lines: Vec<&str> = text.lines().collect();
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        egui::vec2(
            widest as f32 * font.size * advance,
            lines.len().max(1) as f32 * font.size * 1.2,
        )
    }
}

impl TextMeasure for egui::Context {
    fn measure(&self, text: &str, font: &FontRequest) -> egui::Vec2 {
        let font_id = egui_font(font);
        self.fonts_mut(|f| {
            f.layout_no_wrap(text.to_string(), font_id, egui::Color32::BLACK)
                .size()
        })
    }
}

/// The egui font matching a request.
pub fn egui_font(font: &FontRequest) -> egui::FontId {
    let family = if font.is_monospace() {
        egui::FontFamily::Monospace
    } else {
        egui::FontFamily::Proportional
    };
    egui::FontId::new(font.size.max(0.5), family)
}

/// A drawing surface in device units.
pub trait Surface: TextMeasure {
    /// Fills a rectangle.
    fn fill_rect(&mut self, rect: egui::Rect, color: egui::Color32);

    /// Outlines a rectangle.
    fn stroke_rect(&mut self, rect: egui::Rect, stroke: egui::Stroke, dash: LineDash);

    /// Draws a straight line.
    fn line(&mut self, from: egui::Pos2, to: egui::Pos2, stroke: egui::Stroke, dash: LineDash);

    /// Draws a circle with optional fill and outline.
    fn circle(
        &mut self,
        center: egui::Pos2,
        radius: f32,
        fill: Option<egui::Color32>,
        stroke: Option<egui::Stroke>,
    );

    /// Draws a closed polygon with optional fill and outline.
    fn polygon(
        &mut self,
        points: &[egui::Pos2],
        fill: Option<egui::Color32>,
        stroke: Option<egui::Stroke>,
    );

    /// Draws text with its top-left corner at `top_left`.
    fn text(&mut self, top_left: egui::Pos2, text: &str, font: &FontRequest, color: egui::Color32);
}

/// Colors used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Outside the document
    pub off_document: egui::Color32,
    /// Inside the document
    pub document: egui::Color32,
    /// Network lines and icon outlines
    pub ink: egui::Color32,
    /// Links
    pub link: egui::Color32,
    /// Selected items
    pub selection: egui::Color32,
    /// Node labels and annotations
    pub text: egui::Color32,
    /// Grid lines
    pub grid: egui::Color32,
    /// Margin and medium outlines
    pub outline: egui::Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            off_document: egui::Color32::from_gray(200),
            document: egui::Color32::WHITE,
            ink: egui::Color32::BLACK,
            link: egui::Color32::from_rgb(40, 90, 200),
            selection: egui::Color32::from_rgb(255, 200, 0),
            text: egui::Color32::BLACK,
            grid: egui::Color32::from_rgba_unmultiplied(128, 128, 128, 60),
            outline: egui::Color32::from_rgb(200, 60, 60),
        }
    }
}

/// State shared with external overlays during a render pass.
pub struct RenderContext<'a> {
    /// Surface for the active target
    pub surface: &'a mut dyn Surface,
    /// Data to device mapping for the active target
    pub transform: &'a DeviceTransform,
    /// Derived sizes for the active target
    pub sizes: &'a DerivedSizes,
    /// The target being rendered
    pub target: &'a RenderTarget,
}

/// Domain-specific drawing supplied by a collaborator, rendered beneath the
/// standard diagram content on every target.
pub trait DiagramOverlay {
    /// Draws the overlay.
    fn render(&self, ctx: &mut RenderContext<'_>);
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimated_metrics_scale_with_lines_and_size() {
        let font = FontRequest::sized(10.0);
        let one = EstimatedMetrics.measure("abcd", &font);
        let two = EstimatedMetrics.measure("abcd\nab", &font);
        assert_eq!(one.x, two.x);
        assert!((two.y - 2.0 * one.y).abs() < 1e-4);
        let big = EstimatedMetrics.measure("abcd", &FontRequest::sized(20.0));
        assert!((big.x - 2.0 * one.x).abs() < 1e-4);
    }

    #[test]
    fn courier_maps_to_monospace() {
        let spec = FontSpec {
            name: "Courier New".into(),
            ..FontSpec::default()
        };
        let font = egui_font(&FontRequest::new(&spec, 12.0));
        assert_eq!(font.family, egui::FontFamily::Monospace);
    }
}
