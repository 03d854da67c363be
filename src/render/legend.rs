//! Legend layout and drawing.

use super::{draw_icon, FontRequest, Palette, Surface, TextMeasure};
use crate::constants::{LEGEND_PADDING_FRACTION, LEGEND_ROW_SPACING};
use crate::coords::{DataPoint, DataRect, DeviceTransform};
use crate::types::{FontStyle, NodeCategory};
use crate::zoom::DerivedSizes;
use eframe::egui;

struct LegendRow {
    category: NodeCategory,
    natural_flow: bool,
    label: String,
}

/// Legend block measured for one render target.
pub struct LegendLayout {
    rows: Vec<LegendRow>,
    title: FontRequest,
    font: FontRequest,
    icon_diameter: f32,
    padding: f32,
    row_height: f32,
    title_height: f32,
    size: egui::Vec2,
}

impl LegendLayout {
    /// Measures the legend at the sizes derived for the current target.
    pub fn compute<M: TextMeasure + ?Sized>(sizes: &DerivedSizes, measure: &M) -> Self {
        let mut rows: Vec<LegendRow> = NodeCategory::LEGEND
            .iter()
            .map(|&category| LegendRow {
                category,
                natural_flow: false,
                label: category.label().to_string(),
            })
            .collect();
        rows.insert(
            1,
            LegendRow {
                category: NodeCategory::StreamGage,
                natural_flow: true,
                label: "Natural Flow Station".to_string(),
            },
        );

        let font = FontRequest::sized(sizes.label_font);
        let mut title = font.clone();
        title.style = FontStyle::Bold;

        let icon_diameter = sizes.icon_diameter;
        let padding = icon_diameter * LEGEND_PADDING_FRACTION;
        let row_height = icon_diameter.max(font.size) * LEGEND_ROW_SPACING;
        let title_size = measure.measure("Legend", &title);

        let text_width = rows
            .iter()
            .map(|r| measure.measure(&r.label, &font).x)
            .fold(0.0_f32, f32::max);
        let width = (padding * 3.0 + icon_diameter + text_width).max(title_size.x + padding * 2.0);
        let height = padding * 2.0 + title_size.y + row_height * rows.len() as f32;

        Self {
            rows,
            title,
            font,
            icon_diameter,
            padding,
            row_height,
            title_height: title_size.y,
            size: egui::vec2(width, height),
        }
    }

    /// Size in device units.
    pub fn size(&self) -> egui::Vec2 {
        self.size
    }

    /// Extent in data units when the bottom-left corner sits at `anchor`.
    pub fn data_bounds(&self, anchor: DataPoint, transform: &DeviceTransform) -> DataRect {
        DataRect::new(
            anchor.x,
            anchor.y,
            anchor.x + transform.length_to_data(self.size.x),
            anchor.y + transform.length_to_data(self.size.y),
        )
    }

    /// Draws the legend with its bottom-left corner at `bottom_left`.
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        bottom_left: egui::Pos2,
        palette: &Palette,
        line_width: f32,
    ) {
        let rect = egui::Rect::from_min_size(bottom_left - egui::vec2(0.0, self.size.y), self.size);
        let stroke = egui::Stroke::new(line_width, palette.ink);
        surface.fill_rect(rect, palette.document);
        surface.stroke_rect(rect, stroke, super::LineDash::Solid);

        let mut y = rect.min.y + self.padding;
        surface.text(egui::pos2(rect.min.x + self.padding, y), "Legend", &self.title, palette.text);
        y += self.title_height;

        let icon_x = rect.min.x + self.padding + self.icon_diameter / 2.0;
        let text_x = rect.min.x + self.padding * 2.0 + self.icon_diameter;
        for row in &self.rows {
            let mid = y + self.row_height / 2.0;
            draw_icon(
                surface,
                egui::pos2(icon_x, mid),
                self.icon_diameter,
                row.category,
                row.natural_flow,
                stroke,
                palette.document,
            );
            let text_size = surface.measure(&row.label, &self.font);
            surface.text(
                egui::pos2(text_x, mid - text_size.y / 2.0),
                &row.label,
                &self.font,
                palette.text,
            );
            y += self.row_height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::RecordingSurface;
    use super::*;
    use crate::render::{EstimatedMetrics, RenderTarget};
    use crate::types::PageLayout;
    use crate::zoom::ZoomController;

    fn sizes() -> DerivedSizes {
        let doc = DataRect::new(0.0, 0.0, 1000.0, 750.0);
        let zoom = ZoomController::new(doc, 1000.0 / 750.0);
        let target = RenderTarget::interactive(
            egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1000.0, 750.0)),
            96.0,
        );
        let t = DeviceTransform::new(doc, target.device);
        zoom.derived_sizes(&target, &t, &PageLayout::default())
    }

    #[test]
    fn legend_lists_every_category_and_natural_flow() {
        let layout = LegendLayout::compute(&sizes(), &EstimatedMetrics);
        let mut s = RecordingSurface::default();
        layout.draw(&mut s, egui::pos2(10.0, 500.0), &Palette::default(), 1.0);
        let texts = s.texts();
        assert_eq!(texts[0], "Legend");
        assert_eq!(texts.len(), NodeCategory::LEGEND.len() + 2);
        assert!(texts.contains(&"Natural Flow Station"));
    }

    #[test]
    fn legend_grows_with_scale() {
        let small = sizes();
        let mut big = small;
        big.label_font *= 2.0;
        big.icon_diameter *= 2.0;
        let a = LegendLayout::compute(&small, &EstimatedMetrics).size();
        let b = LegendLayout::compute(&big, &EstimatedMetrics).size();
        assert!((b.x - 2.0 * a.x).abs() < 1e-3);
        assert!((b.y - 2.0 * a.y).abs() < 1e-3);
    }
}
