//! SVG surface used for print and raster export.
//!
//! Drawing calls are accumulated as SVG elements; the finished document is
//! rasterized with resvg into a tiny-skia pixmap.

use super::{FontRequest, LineDash, Surface, TextMeasure};
use crate::error::{DiagramError, Result};
use crate::types::FontStyle;
use eframe::egui;
use std::fmt::Write as _;
use std::sync::Arc;

/// Surface that writes SVG elements into a string.
pub struct SvgSurface<'a> {
    width: u32,
    height: u32,
    body: String,
    measure: &'a dyn TextMeasure,
    antialias: bool,
}

impl<'a> SvgSurface<'a> {
    /// Creates an empty surface of `width`×`height` pixels.
    ///
    /// # Arguments
    ///
    /// * `measure` - Text metrics used for layout decisions
    /// * `antialias` - When false, shapes are rendered with crisp edges
    pub fn new(width: u32, height: u32, measure: &'a dyn TextMeasure, antialias: bool) -> Self {
        Self {
            width,
            height,
            body: String::new(),
            measure,
            antialias,
        }
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Completes the SVG document.
    pub fn finish(self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = self.width,
            h = self.height
        );
        if self.antialias {
            out.push_str("<g>\n");
        } else {
            out.push_str("<g shape-rendering=\"crispEdges\">\n");
        }
        out.push_str(&self.body);
        out.push_str("</g>\n</svg>\n");
        out
    }
}

fn paint(attr: &str, color: egui::Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    format!(
        "{attr}=\"#{r:02x}{g:02x}{b:02x}\" {attr}-opacity=\"{:.3}\"",
        a as f32 / 255.0
    )
}

fn fill_attr(fill: Option<egui::Color32>) -> String {
    match fill {
        Some(c) => paint("fill", c),
        None => "fill=\"none\"".to_string(),
    }
}

fn stroke_attr(stroke: Option<egui::Stroke>, dash: LineDash) -> String {
    let Some(stroke) = stroke.filter(|s| s.width > 0.0) else {
        return "stroke=\"none\"".to_string();
    };
    let w = stroke.width;
    let pattern = match dash {
        LineDash::Solid => String::new(),
        LineDash::Dashed => format!(" stroke-dasharray=\"{:.2},{:.2}\"", w * 4.0, w * 3.0),
        LineDash::Dotted => format!(
            " stroke-dasharray=\"{:.2},{:.2}\" stroke-linecap=\"round\"",
            w * 0.1,
            w * 2.0
        ),
    };
    format!(
        "{} stroke-width=\"{:.2}\"{}",
        paint("stroke", stroke.color),
        w,
        pattern
    )
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

impl TextMeasure for SvgSurface<'_> {
    fn measure(&self, text: &str, font: &FontRequest) -> egui::Vec2 {
        self.measure.measure(text, font)
    }
}

impl Surface for SvgSurface<'_> {
    fn fill_rect(&mut self, rect: egui::Rect, color: egui::Color32) {
        let _ = writeln!(
            self.body,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {} />",
            rect.min.x,
            rect.min.y,
            rect.width(),
            rect.height(),
            paint("fill", color)
        );
    }

    fn stroke_rect(&mut self, rect: egui::Rect, stroke: egui::Stroke, dash: LineDash) {
        let _ = writeln!(
            self.body,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" {} />",
            rect.min.x,
            rect.min.y,
            rect.width(),
            rect.height(),
            stroke_attr(Some(stroke), dash)
        );
    }

    fn line(&mut self, from: egui::Pos2, to: egui::Pos2, stroke: egui::Stroke, dash: LineDash) {
        let _ = writeln!(
            self.body,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" {} />",
            from.x,
            from.y,
            to.x,
            to.y,
            stroke_attr(Some(stroke), dash)
        );
    }

    fn circle(
        &mut self,
        center: egui::Pos2,
        radius: f32,
        fill: Option<egui::Color32>,
        stroke: Option<egui::Stroke>,
    ) {
        let _ = writeln!(
            self.body,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" {} {} />",
            center.x,
            center.y,
            radius,
            fill_attr(fill),
            stroke_attr(stroke, LineDash::Solid)
        );
    }

    fn polygon(
        &mut self,
        points: &[egui::Pos2],
        fill: Option<egui::Color32>,
        stroke: Option<egui::Stroke>,
    ) {
        if points.len() < 2 {
            return;
        }
        let mut pts = String::new();
        for p in points {
            let _ = write!(pts, "{:.2},{:.2} ", p.x, p.y);
        }
        let _ = writeln!(
            self.body,
            "<polygon points=\"{}\" {} {} />",
            pts.trim_end(),
            fill_attr(fill),
            stroke_attr(stroke, LineDash::Solid)
        );
    }

    fn text(&mut self, top_left: egui::Pos2, text: &str, font: &FontRequest, color: egui::Color32) {
        let (weight, slant) = match font.style {
            FontStyle::Plain => ("normal", "normal"),
            FontStyle::Bold => ("bold", "normal"),
            FontStyle::Italic => ("normal", "italic"),
            FontStyle::BoldItalic => ("bold", "italic"),
        };
        let fallback = if font.is_monospace() { "monospace" } else { "sans-serif" };
        let line_height = font.size * 1.2;
        // SVG positions text by baseline; approximate the ascent.
        let baseline = top_left.y + font.size * 0.9;
        let _ = writeln!(
            self.body,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}, {}\" font-size=\"{:.2}\" font-weight=\"{}\" font-style=\"{}\" {}>",
            top_left.x,
            baseline,
            escape_xml(&font.family),
            fallback,
            font.size,
            weight,
            slant,
            paint("fill", color)
        );
        for (i, line) in text.lines().enumerate() {
            let dy = if i == 0 { 0.0 } else { line_height };
            let _ = writeln!(
                self.body,
                "  <tspan x=\"{:.2}\" dy=\"{:.2}\">{}</tspan>",
                top_left.x,
                dy,
                escape_xml(line)
            );
        }
        self.body.push_str("</text>\n");
    }
}

/// Rasterizes an SVG document into a pixmap of `width`×`height` pixels.
///
/// System fonts are loaded so text renders with the requested families where
/// available.
pub fn rasterize(svg: &str, width: u32, height: u32) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    opt.fontdb = Arc::new(db);

    let tree = usvg::Tree::from_data(svg.as_bytes(), &opt)?;
    let mut pixmap = tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or(DiagramError::Allocation { width, height })?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::EstimatedMetrics;

    #[test]
    fn text_is_escaped_and_split_into_lines() {
        let mut s = SvgSurface::new(100, 50, &EstimatedMetrics, true);
        s.text(
            egui::pos2(1.0, 2.0),
            "a<b\nc&d",
            &FontRequest::sized(10.0),
            egui::Color32::BLACK,
        );
        let svg = s.finish();
        assert!(svg.contains("a&lt;b"));
        assert!(svg.contains("c&amp;d"));
        assert_eq!(svg.matches("<tspan").count(), 2);
    }

    #[test]
    fn crisp_edges_when_not_antialiased() {
        let s = SvgSurface::new(10, 10, &EstimatedMetrics, false);
        assert!(s.finish().contains("crispEdges"));
        let s = SvgSurface::new(10, 10, &EstimatedMetrics, true);
        assert!(!s.finish().contains("crispEdges"));
    }

    #[test]
    fn dotted_lines_get_a_dash_array() {
        let mut s = SvgSurface::new(10, 10, &EstimatedMetrics, true);
        let stroke = egui::Stroke::new(2.0, egui::Color32::BLACK);
        s.line(egui::pos2(0.0, 0.0), egui::pos2(5.0, 5.0), stroke, LineDash::Dotted);
        assert!(s.finish().contains("stroke-dasharray"));
    }

    #[test]
    fn rasterized_fill_lands_in_pixels() {
        let mut s = SvgSurface::new(20, 10, &EstimatedMetrics, false);
        s.fill_rect(
            egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(20.0, 10.0)),
            egui::Color32::from_rgb(255, 0, 0),
        );
        let pixmap = rasterize(&s.finish(), 20, 10).expect("rasterize");
        assert_eq!((pixmap.width(), pixmap.height()), (20, 10));
        let px = pixmap.pixel(5, 5).expect("pixel");
        assert_eq!((px.red(), px.green(), px.blue()), (255, 0, 0));
    }
}
