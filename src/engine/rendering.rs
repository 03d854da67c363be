//! The render pipeline.
//!
//! One function draws every target. Steps run in a fixed order: background,
//! external overlays, links, nodes, legend, annotations, diagnostics, and on
//! the interactive canvas the gesture feedback on top.

use super::DiagramEngine;
use crate::constants::{MIN_FONT_SIZE, MIN_GRID_PIXELS};
use crate::coords::{aspect_fit, device_aspect, Buffer, DataPoint, DataRect, DeviceTransform};
use crate::interaction::DragState;
use crate::render::{
    draw_arrowhead, draw_icon, FontRequest, LegendLayout, LineDash, RenderContext, RenderTarget,
    Surface,
};
use crate::types::{LineStyle, Node, NodeCategory};
use crate::zoom::DerivedSizes;
use eframe::egui;
use std::collections::HashSet;

impl DiagramEngine {
    /// The data rectangle shown on `target`.
    ///
    /// The interactive canvas shows the zoomed view; print and export show the
    /// whole document fitted to the target's aspect ratio.
    pub fn view_for(&self, target: &RenderTarget) -> DataRect {
        if target.is_interactive() {
            self.zoom.view_rect()
        } else {
            aspect_fit(self.zoom.document(), device_aspect(target.device), Buffer::default())
        }
    }

    /// Draws the diagram onto `surface` for `target`.
    ///
    /// Sizes are derived for this target on every call. Annotation and legend
    /// bounds are updated as a side effect so hit-testing matches what was drawn.
    pub fn render(&mut self, surface: &mut dyn Surface, target: &RenderTarget) {
        let transform = DeviceTransform::new(self.view_for(target), target.device);
        let sizes = self.zoom.derived_sizes(target, &transform, &self.layout);

        self.draw_background(surface, &transform, target);
        self.draw_overlays(surface, &transform, &sizes, target);
        self.draw_links(surface, &transform, &sizes);
        self.draw_nodes(surface, &transform, &sizes);
        self.draw_legend(surface, &transform, &sizes);
        self.draw_annotations(surface, &transform, &sizes);
        self.draw_diagnostics(surface, &transform);
        if target.is_interactive() {
            self.draw_gesture(surface, &transform, &sizes);
        }
    }

    fn draw_background(
        &self,
        surface: &mut dyn Surface,
        transform: &DeviceTransform,
        target: &RenderTarget,
    ) {
        surface.fill_rect(target.device, self.palette.off_document);
        let document = transform
            .rect_to_device(&self.zoom.document())
            .intersect(target.device);
        if document.is_positive() {
            surface.fill_rect(document, self.palette.document);
        }
    }

    fn draw_overlays(
        &self,
        surface: &mut dyn Surface,
        transform: &DeviceTransform,
        sizes: &DerivedSizes,
        target: &RenderTarget,
    ) {
        for overlay in &self.overlays {
            let mut ctx = RenderContext {
                surface: &mut *surface,
                transform,
                sizes,
                target,
            };
            overlay.render(&mut ctx);
        }
    }

    /// The first drawn node downstream of `id`, passing over unknown-category
    /// placeholders.
    fn drawn_downstream(&self, id: &str) -> Option<&Node> {
        let net = self.model.network();
        let mut seen = HashSet::new();
        let mut current = net.downstream_of(id);
        while let Some(next) = current {
            if !seen.insert(next) {
                return None;
            }
            match self.model.node_by_id(next) {
                Some(n) if n.category != NodeCategory::Unknown => return Some(n),
                Some(_) => current = net.downstream_of(next),
                None => return None,
            }
        }
        None
    }

    /// Connections ending at a node that flows into a convergence are dotted.
    fn flows_into_convergence(&self, to: &Node) -> bool {
        self.drawn_downstream(&to.id)
            .is_some_and(|n| n.category.is_convergence())
    }

    fn draw_links(&self, surface: &mut dyn Surface, transform: &DeviceTransform, sizes: &DerivedSizes) {
        let river = egui::Stroke::new(sizes.line_width, self.palette.ink);
        for node in self.model.ordered_nodes() {
            let Some(down) = self.drawn_downstream(&node.id) else {
                continue;
            };
            let dash = if self.flows_into_convergence(down) {
                LineDash::Dotted
            } else {
                LineDash::Solid
            };
            surface.line(
                transform.data_to_device(node.position),
                transform.data_to_device(down.position),
                river,
                dash,
            );
        }

        let stroke = egui::Stroke::new(sizes.line_width, self.palette.link);
        let radius = sizes.icon_diameter / 2.0;
        let arrow = (sizes.icon_diameter * 0.6).max(sizes.line_width * 4.0);
        for link in self.model.network().links() {
            let (Some(from), Some(to)) = (
                self.model.node_by_id(&link.from),
                self.model.node_by_id(&link.to),
            ) else {
                log::debug!("link {} -> {} has a missing endpoint; skipped", link.from, link.to);
                continue;
            };
            let dash = if self.flows_into_convergence(to) {
                LineDash::Dotted
            } else {
                match link.line_style {
                    LineStyle::Solid => LineDash::Solid,
                    LineStyle::Dashed => LineDash::Dashed,
                }
            };
            let a = transform.data_to_device(from.position);
            let b = transform.data_to_device(to.position);
            surface.line(a, b, stroke, dash);

            let dir = (b - a).normalized();
            if dir.is_finite() && dir != egui::Vec2::ZERO {
                draw_arrowhead(surface, a, b - dir * radius, arrow, link.to_arrow, stroke);
                draw_arrowhead(surface, b, a + dir * radius, arrow, link.from_arrow, stroke);
            }
        }
    }

    fn draw_nodes(&self, surface: &mut dyn Surface, transform: &DeviceTransform, sizes: &DerivedSizes) {
        let stroke = egui::Stroke::new(sizes.line_width, self.palette.ink);
        let highlight = egui::Stroke::new(sizes.line_width * 1.5, self.palette.selection);
        let font = FontRequest::sized(sizes.label_font);
        let gap = sizes.icon_diameter_data / 2.0;

        for node in self.model.ordered_nodes() {
            let center = transform.data_to_device(node.position);
            draw_icon(
                surface,
                center,
                sizes.icon_diameter,
                node.category,
                node.natural_flow,
                stroke,
                self.palette.document,
            );
            if node.selected {
                surface.circle(
                    center,
                    sizes.icon_diameter / 2.0 + sizes.line_width * 2.0,
                    None,
                    Some(highlight),
                );
            }
            if font.size < MIN_FONT_SIZE {
                continue;
            }
            let size = surface.measure(&node.id, &font);
            let label = node.label_position.text_box(
                node.position,
                transform.length_to_data(size.x),
                size.y as f64 / transform.scale_y(),
                gap,
            );
            let top_left = transform.rect_to_device(&label).min;
            surface.text(top_left, &node.id, &font, self.palette.text);
        }
    }

    fn draw_legend(&mut self, surface: &mut dyn Surface, transform: &DeviceTransform, sizes: &DerivedSizes) {
        let layout = LegendLayout::compute(sizes, &*surface);
        let anchor = self.model.legend().anchor;
        self.model.legend_mut().bounds = Some(layout.data_bounds(anchor, transform));
        if self.drag.is_dragging_legend() {
            return;
        }
        layout.draw(
            surface,
            transform.data_to_device(anchor),
            &self.palette,
            sizes.line_width,
        );
    }

    fn draw_annotations(
        &mut self,
        surface: &mut dyn Surface,
        transform: &DeviceTransform,
        sizes: &DerivedSizes,
    ) {
        let dragged = self.drag.dragged_annotation();
        let palette = self.palette;
        let highlight = egui::Stroke::new(sizes.line_width, palette.selection);
        for (i, a) in self.model.annotations_mut().iter_mut().enumerate() {
            let font = FontRequest::new(&a.font, sizes.font_size(a.font.size_pt));
            let size = surface.measure(&a.text, &font);
            let bounds = a.position.text_box(
                a.anchor,
                transform.length_to_data(size.x),
                size.y as f64 / transform.scale_y(),
                0.0,
            );
            a.bounds = Some(bounds);
            if dragged == Some(i) || font.size < MIN_FONT_SIZE {
                continue;
            }
            let rect = transform.rect_to_device(&bounds);
            surface.text(rect.min, &a.text, &font, palette.text);
            if a.selected {
                surface.stroke_rect(rect, highlight, LineDash::Solid);
            }
        }
    }

    fn draw_diagnostics(&self, surface: &mut dyn Surface, transform: &DeviceTransform) {
        let device = transform.device_rect();
        let view = transform.data_rect();
        let spacing = self.settings.grid_spacing;

        if self.settings.show_grid
            && spacing > 0.0
            && transform.length_to_device(spacing) >= MIN_GRID_PIXELS
        {
            let stroke = egui::Stroke::new(1.0, self.palette.grid);
            let mut x = (view.min_x / spacing).ceil() * spacing;
            while x <= view.max_x {
                let px = transform.data_to_device(DataPoint::new(x, view.min_y)).x;
                surface.line(
                    egui::pos2(px, device.min.y),
                    egui::pos2(px, device.max.y),
                    stroke,
                    LineDash::Solid,
                );
                x += spacing;
            }
            let mut y = (view.min_y / spacing).ceil() * spacing;
            while y <= view.max_y {
                let py = transform.data_to_device(DataPoint::new(view.min_x, y)).y;
                surface.line(
                    egui::pos2(device.min.x, py),
                    egui::pos2(device.max.x, py),
                    stroke,
                    LineDash::Solid,
                );
                y += spacing;
            }
        }

        let document = self.zoom.document();
        let outline = egui::Stroke::new(1.0, self.palette.outline);
        if self.settings.show_margins {
            surface.stroke_rect(transform.rect_to_device(&document), outline, LineDash::Dashed);
        }
        if self.settings.show_medium {
            let printable = self.layout.printable();
            let margin = self.layout.margin_in * document.width() / printable.width_in;
            let medium = document.expand(Buffer::uniform(margin));
            surface.stroke_rect(transform.rect_to_device(&medium), outline, LineDash::Solid);
        }
    }

    /// Feedback for the active gesture, drawn over everything else.
    fn draw_gesture(&self, surface: &mut dyn Surface, transform: &DeviceTransform, sizes: &DerivedSizes) {
        let stroke = egui::Stroke::new(sizes.line_width.max(1.0), self.palette.selection);
        let outline = match &self.drag {
            DragState::RubberBand { origin, current } => {
                let rect = egui::Rect::from_two_pos(*origin, *current);
                surface.fill_rect(rect, self.palette.selection.gamma_multiply(0.15));
                Some(rect)
            }
            DragState::DraggingLegend { .. } => self.model.legend().bounds.map(|b| transform.rect_to_device(&b)),
            DragState::DraggingAnnotation { index, .. } => self
                .model
                .annotations()
                .get(*index)
                .and_then(|a| a.bounds)
                .map(|b| transform.rect_to_device(&b)),
            _ => None,
        };
        if let Some(rect) = outline {
            surface.stroke_rect(rect, stroke, LineDash::Dashed);
        }
    }
}
