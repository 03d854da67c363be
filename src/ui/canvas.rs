//! The interactive canvas.
//!
//! Pointer input is forwarded to the engine in device units and the engine's
//! render pipeline draws through an [`EguiSurface`] onto the canvas painter.

use super::state::DiagramApp;
use crate::render::{egui_font, FontRequest, LineDash, Surface, TextMeasure};
use eframe::egui;

/// A [`Surface`] drawing through an egui painter.
pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
}

impl<'a> EguiSurface<'a> {
    /// Wraps `painter`.
    pub fn new(painter: &'a egui::Painter) -> Self {
        Self { painter }
    }

    fn path(&self, points: &[egui::Pos2], stroke: egui::Stroke, dash: LineDash) {
        match dash {
            LineDash::Solid => {
                self.painter
                    .add(egui::Shape::line(points.to_vec(), stroke));
            }
            LineDash::Dashed => {
                let dash_len = (stroke.width * 4.0).max(3.0);
                let gap_len = (stroke.width * 3.0).max(2.0);
                self.painter
                    .extend(egui::Shape::dashed_line(points, stroke, dash_len, gap_len));
            }
            LineDash::Dotted => {
                let spacing = (stroke.width * 2.0).max(3.0);
                let radius = (stroke.width * 0.5).max(0.5);
                self.painter
                    .extend(egui::Shape::dotted_line(points, stroke.color, spacing, radius));
            }
        }
    }
}

impl TextMeasure for EguiSurface<'_> {
    fn measure(&self, text: &str, font: &FontRequest) -> egui::Vec2 {
        self.painter.ctx().measure(text, font)
    }
}

impl Surface for EguiSurface<'_> {
    fn fill_rect(&mut self, rect: egui::Rect, color: egui::Color32) {
        self.painter.rect_filled(rect, 0.0, color);
    }

    fn stroke_rect(&mut self, rect: egui::Rect, stroke: egui::Stroke, dash: LineDash) {
        match dash {
            LineDash::Solid => {
                self.painter
                    .rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Middle);
            }
            _ => {
                let corners = [
                    rect.left_top(),
                    rect.right_top(),
                    rect.right_bottom(),
                    rect.left_bottom(),
                    rect.left_top(),
                ];
                self.path(&corners, stroke, dash);
            }
        }
    }

    fn line(&mut self, from: egui::Pos2, to: egui::Pos2, stroke: egui::Stroke, dash: LineDash) {
        self.path(&[from, to], stroke, dash);
    }

    fn circle(
        &mut self,
        center: egui::Pos2,
        radius: f32,
        fill: Option<egui::Color32>,
        stroke: Option<egui::Stroke>,
    ) {
        self.painter.circle(
            center,
            radius,
            fill.unwrap_or(egui::Color32::TRANSPARENT),
            stroke.unwrap_or(egui::Stroke::NONE),
        );
    }

    fn polygon(
        &mut self,
        points: &[egui::Pos2],
        fill: Option<egui::Color32>,
        stroke: Option<egui::Stroke>,
    ) {
        self.painter.add(egui::Shape::convex_polygon(
            points.to_vec(),
            fill.unwrap_or(egui::Color32::TRANSPARENT),
            stroke.unwrap_or(egui::Stroke::NONE),
        ));
    }

    fn text(&mut self, top_left: egui::Pos2, text: &str, font: &FontRequest, color: egui::Color32) {
        self.painter
            .text(top_left, egui::Align2::LEFT_TOP, text, egui_font(font), color);
    }
}

/// Pointer state sampled once per frame.
struct PointerSample {
    pos: Option<egui::Pos2>,
    primary_pressed: bool,
    middle_pressed: bool,
    released: bool,
    modifiers: egui::Modifiers,
    scroll: f32,
}

impl DiagramApp {
    /// Draws the canvas and routes pointer input to the engine.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI to allocate the canvas in
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        self.engine.set_viewport(response.rect);

        let sample = ui.input(|i| PointerSample {
            pos: i.pointer.interact_pos().or_else(|| i.pointer.latest_pos()),
            primary_pressed: i.pointer.primary_pressed(),
            middle_pressed: i.pointer.button_pressed(egui::PointerButton::Middle),
            released: i.pointer.any_released(),
            modifiers: i.modifiers,
            scroll: i.raw_scroll_delta.y,
        });
        self.handle_canvas_pointer(&sample, response.rect);

        let ctx = ui.ctx().clone();
        let target = self.engine.interactive_target(ctx.pixels_per_point());
        ctx.tessellation_options_mut(|o| o.feathering = target.antialias);
        let mut surface = EguiSurface::new(&painter);
        self.engine.render(&mut surface, &target);

        if self.engine.take_redraw_request() {
            ctx.request_repaint();
        }
    }

    fn handle_canvas_pointer(&mut self, sample: &PointerSample, rect: egui::Rect) {
        let Some(pos) = sample.pos else {
            return;
        };
        let inside = rect.contains(pos);

        if inside && sample.scroll != 0.0 && self.engine.drag_state().is_idle() {
            if sample.scroll > 0.0 {
                self.engine.zoom_in();
            } else {
                self.engine.zoom_out();
            }
        }

        if inside && sample.primary_pressed {
            self.engine.pointer_down(pos, sample.modifiers);
        } else if inside && sample.middle_pressed {
            self.engine.start_pan(pos);
        }

        if !self.engine.drag_state().is_idle() {
            if sample.released {
                self.engine.pointer_up(pos);
            } else {
                self.engine.pointer_move(pos);
            }
        }
    }
}
