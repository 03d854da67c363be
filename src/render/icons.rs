//! Node icons and link arrowheads.

use super::Surface;
use crate::types::{ArrowStyle, IconShape, NodeCategory};
use eframe::egui;

/// Draws the icon for `category` centered at `center`.
///
/// Natural-flow stations get a smaller concentric ring inside the icon.
pub fn draw_icon(
    surface: &mut dyn Surface,
    center: egui::Pos2,
    diameter: f32,
    category: NodeCategory,
    natural_flow: bool,
    stroke: egui::Stroke,
    background: egui::Color32,
) {
    let style = category.icon();
    let r = diameter / 2.0;
    let fill = if style.filled { stroke.color } else { background };

    match style.shape {
        IconShape::Circle => surface.circle(center, r, Some(fill), Some(stroke)),
        IconShape::Dot => surface.circle(center, r / 2.0, Some(fill), Some(stroke)),
        IconShape::Square => {
            let rect = egui::Rect::from_center_size(center, egui::vec2(diameter, diameter) * 0.85);
            surface.polygon(
                &[rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()],
                Some(fill),
                Some(stroke),
            );
        }
        IconShape::Triangle => {
            // Equilateral, centroid on the node position.
            let h = diameter * 0.866;
            surface.polygon(
                &[
                    egui::pos2(center.x, center.y - h * 2.0 / 3.0),
                    egui::pos2(center.x + r, center.y + h / 3.0),
                    egui::pos2(center.x - r, center.y + h / 3.0),
                ],
                Some(fill),
                Some(stroke),
            );
        }
        IconShape::Diamond => surface.polygon(
            &[
                egui::pos2(center.x, center.y - r),
                egui::pos2(center.x + r, center.y),
                egui::pos2(center.x, center.y + r),
                egui::pos2(center.x - r, center.y),
            ],
            Some(fill),
            Some(stroke),
        ),
        IconShape::CircleCross => {
            surface.circle(center, r, Some(fill), Some(stroke));
            let d = r * std::f32::consts::FRAC_1_SQRT_2;
            let solid = super::LineDash::Solid;
            surface.line(center + egui::vec2(-d, -d), center + egui::vec2(d, d), stroke, solid);
            surface.line(center + egui::vec2(-d, d), center + egui::vec2(d, -d), stroke, solid);
        }
    }

    if natural_flow {
        let ring = if style.filled { background } else { stroke.color };
        surface.circle(
            center,
            r * 0.35,
            None,
            Some(egui::Stroke::new(stroke.width, ring)),
        );
    }
}

/// Draws an arrowhead whose tip is at `tip`, pointing away from `from`.
pub fn draw_arrowhead(
    surface: &mut dyn Surface,
    from: egui::Pos2,
    tip: egui::Pos2,
    size: f32,
    style: ArrowStyle,
    stroke: egui::Stroke,
) {
    if style == ArrowStyle::None {
        return;
    }
    let dir = tip - from;
    if dir.length_sq() < f32::EPSILON {
        return;
    }
    let dir = dir.normalized();
    let perp = egui::vec2(-dir.y, dir.x);
    let base = tip - dir * size;
    let left = base + perp * (size * 0.5);
    let right = base - perp * (size * 0.5);
    match style {
        ArrowStyle::Filled => surface.polygon(&[tip, left, right], Some(stroke.color), Some(stroke)),
        ArrowStyle::Open => {
            surface.line(left, tip, stroke, super::LineDash::Solid);
            surface.line(right, tip, stroke, super::LineDash::Solid);
        }
        ArrowStyle::None => {}
    }
}
