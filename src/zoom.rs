//! Zoom and scale control.
//!
//! The visible region is stored as a center plus extents so that zooming in and
//! back out (both exact powers of two) restores the previous view bit for bit.
//! 100% zoom means the screen shows the diagram at the size it prints.

use crate::constants::{
    ANTIALIAS_ZOOM_PERCENT, BASE_LINE_PT, MAX_VIEW_TO_DOCUMENT_RATIO,
    MIN_VIEW_TO_DOCUMENT_RATIO, POINTS_PER_INCH,
};
use crate::coords::{aspect_fit, Buffer, DataPoint, DataRect, DeviceTransform};
use crate::render::RenderTarget;
use crate::types::{Medium, PageLayout};
use eframe::egui;

/// Result of a zoom request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomOutcome {
    /// The visible extents changed
    Changed,
    /// The request would exceed a zoom limit and was rejected
    Limited,
}

/// Font, icon and line sizes for one render target at its current scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedSizes {
    /// Toolkit units per point of configured size
    pub units_per_point: f64,
    /// Node label font size in toolkit units
    pub label_font: f32,
    /// Node icon diameter in device units
    pub icon_diameter: f32,
    /// Node icon diameter in data units
    pub icon_diameter_data: f64,
    /// Network line thickness in device units
    pub line_width: f32,
    /// Ratio of the current scale to the full-scale (100%) scale
    pub scale_ratio: f64,
    font_multiplier: f32,
}

impl DerivedSizes {
    /// Converts a configured font size in points to toolkit units.
    pub fn font_size(&self, size_pt: f64) -> f32 {
        (size_pt * self.units_per_point) as f32 * self.font_multiplier
    }
}

/// Tracks the visible data extents of the interactive view.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomController {
    document: DataRect,
    center: DataPoint,
    width: f64,
    height: f64,
}

impl ZoomController {
    /// Creates a controller showing the whole document on a device of `aspect`.
    pub fn new(document: DataRect, aspect: f64) -> Self {
        let mut zoom = Self {
            document,
            center: document.center(),
            width: document.width(),
            height: document.height(),
        };
        zoom.fit_document(aspect);
        zoom
    }

    /// The full document rectangle.
    pub fn document(&self) -> DataRect {
        self.document
    }

    /// Replaces the document and shows all of it.
    pub fn set_document(&mut self, document: DataRect, aspect: f64) {
        self.document = document;
        self.fit_document(aspect);
    }

    /// Shows the whole document on a device of `aspect`.
    pub fn fit_document(&mut self, aspect: f64) {
        let view = aspect_fit(self.document, aspect, Buffer::default());
        self.center = view.center();
        self.width = view.width();
        self.height = view.height();
    }

    /// Keeps width and center, adjusting height to a new device aspect.
    ///
    /// The pan limits are re-applied since the new height may exceed the
    /// document.
    pub fn set_device_aspect(&mut self, aspect: f64) {
        if aspect > 0.0 && aspect.is_finite() {
            self.height = self.width / aspect;
            self.pan_by(0.0, 0.0);
        }
    }

    /// The visible data rectangle.
    pub fn view_rect(&self) -> DataRect {
        DataRect::from_center(self.center, self.width, self.height)
    }

    /// Center of the visible area.
    pub fn center(&self) -> DataPoint {
        self.center
    }

    /// Visible extents `(width, height)`.
    pub fn extents(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn ratio_after(&self, factor: f64) -> f64 {
        self.width * factor / self.document.width()
    }

    /// Halves the visible extents around the current center.
    pub fn zoom_in(&mut self) -> ZoomOutcome {
        self.scale_extents(0.5)
    }

    /// Doubles the visible extents around the current center.
    pub fn zoom_out(&mut self) -> ZoomOutcome {
        self.scale_extents(2.0)
    }

    fn scale_extents(&mut self, factor: f64) -> ZoomOutcome {
        let ratio = self.ratio_after(factor);
        if !(MIN_VIEW_TO_DOCUMENT_RATIO..=MAX_VIEW_TO_DOCUMENT_RATIO).contains(&ratio) {
            log::debug!("zoom rejected: view/document ratio would be {ratio:.3}");
            return ZoomOutcome::Limited;
        }
        self.width *= factor;
        self.height *= factor;
        ZoomOutcome::Changed
    }

    /// Data units per inch of paper when the document prints on `printable`.
    fn data_per_inch(&self, printable: Medium) -> f64 {
        self.document.width() / printable.width_in
    }

    /// Sets the extents so the screen shows the diagram at its printed size.
    ///
    /// # Arguments
    ///
    /// * `device` - Interactive canvas rectangle in device units
    /// * `dpi` - Device units per inch of the canvas
    /// * `printable` - Printable area of the active page layout
    pub fn zoom_to_actual_size(&mut self, device: egui::Rect, dpi: f32, printable: Medium) {
        let per_inch = self.data_per_inch(printable);
        self.width = device.width() as f64 / dpi as f64 * per_inch;
        self.height = device.height() as f64 / dpi as f64 * per_inch;
    }

    /// Current zoom as a percentage of full (printed) size.
    pub fn zoom_percent(&self, device: egui::Rect, dpi: f32, printable: Medium) -> f64 {
        let full_scale = dpi as f64 / self.data_per_inch(printable);
        let current = device.width() as f64 / self.width;
        current / full_scale * 100.0
    }

    /// Whether anti-aliasing should be used at `percent` zoom.
    pub fn antialias_at(percent: f64) -> bool {
        percent >= ANTIALIAS_ZOOM_PERCENT
    }

    /// Moves the view by a data delta.
    ///
    /// On an axis where the view is larger than the document the document must
    /// stay fully visible; on an axis where the document is larger the view moves
    /// freely.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let doc = self.document;
        self.center.x = pan_axis(self.center.x + dx, self.width, doc.min_x, doc.max_x);
        self.center.y = pan_axis(self.center.y + dy, self.height, doc.min_y, doc.max_y);
    }

    /// Re-centers the view on `p` without changing extents.
    pub fn center_on(&mut self, p: DataPoint) {
        self.center = p;
        self.pan_by(0.0, 0.0);
    }

    /// Icon diameter in data units for a page layout.
    ///
    /// This is the same on every target because icons scale with the drawing.
    pub fn icon_diameter_data(&self, layout: &PageLayout) -> f64 {
        layout.node_size_pt / POINTS_PER_INCH * self.data_per_inch(layout.printable())
    }

    /// Derives font, icon and line sizes for `target` drawn through `transform`.
    ///
    /// A size in points becomes device pixels using the target DPI and the ratio
    /// of the current scale to full scale, then toolkit units using the target's
    /// pixels per unit. Screen and print DPI differ, so going through physical
    /// size is what keeps the proportions identical across targets.
    pub fn derived_sizes(
        &self,
        target: &RenderTarget,
        transform: &DeviceTransform,
        layout: &PageLayout,
    ) -> DerivedSizes {
        let dpi = target.dpi as f64;
        let ppu = target.pixels_per_unit.max(f32::EPSILON) as f64;
        let full_scale = dpi / self.data_per_inch(layout.printable());
        let current = transform.scale_x() * ppu;
        let scale_ratio = if full_scale > 0.0 { current / full_scale } else { 1.0 };

        let pixels_per_point = dpi / POINTS_PER_INCH * scale_ratio;
        let units_per_point = pixels_per_point / ppu;
        let icon_units = (layout.node_size_pt * units_per_point) as f32;
        let line_units =
            ((BASE_LINE_PT * units_per_point) as f32 * target.line_multiplier).max(0.5);

        DerivedSizes {
            units_per_point,
            label_font: (layout.font_size_pt * units_per_point) as f32 * target.font_multiplier,
            icon_diameter: icon_units,
            icon_diameter_data: icon_units as f64 / transform.scale_x(),
            line_width: line_units,
            scale_ratio,
            font_multiplier: target.font_multiplier,
        }
    }
}

fn pan_axis(center: f64, extent: f64, lo: f64, hi: f64) -> f64 {
    if extent >= hi - lo {
        // View larger than the document: keep the document inside the view.
        center.clamp(hi - extent / 2.0, lo + extent / 2.0)
    } else {
        center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Orientation, PaperSize};

    fn layout() -> PageLayout {
        PageLayout {
            paper: PaperSize::Letter,
            orientation: Orientation::Landscape,
            margin_in: 0.5,
            node_size_pt: 18.0,
            font_size_pt: 9.0,
            ..PageLayout::default()
        }
    }

    fn document() -> DataRect {
        // 10 x 7.5 in printable area => 100 data units per inch
        DataRect::new(0.0, 0.0, 1000.0, 750.0)
    }

    #[test]
    fn zoom_in_then_out_restores_extents_exactly() {
        let mut zoom = ZoomController::new(document(), 1.6);
        zoom.pan_by(3.3, -7.1);
        let before = (zoom.view_rect(), zoom.extents());
        assert_eq!(zoom.zoom_in(), ZoomOutcome::Changed);
        assert_eq!(zoom.zoom_out(), ZoomOutcome::Changed);
        assert_eq!((zoom.view_rect(), zoom.extents()), before);

        assert_eq!(zoom.zoom_out(), ZoomOutcome::Changed);
        assert_eq!(zoom.zoom_in(), ZoomOutcome::Changed);
        assert_eq!((zoom.view_rect(), zoom.extents()), before);
    }

    #[test]
    fn zoom_limits_are_stable() {
        let mut zoom = ZoomController::new(document(), 1000.0 / 750.0);
        let mut steps = 0;
        while zoom.zoom_out() == ZoomOutcome::Changed {
            steps += 1;
            assert!(steps < 10);
        }
        let limited = zoom.extents();
        assert!(limited.0 / 1000.0 <= MAX_VIEW_TO_DOCUMENT_RATIO);
        assert_eq!(zoom.zoom_out(), ZoomOutcome::Limited);
        assert_eq!(zoom.extents(), limited);

        while zoom.zoom_in() == ZoomOutcome::Changed {}
        let limited = zoom.extents();
        assert!(limited.0 / 1000.0 >= MIN_VIEW_TO_DOCUMENT_RATIO);
        assert_eq!(zoom.zoom_in(), ZoomOutcome::Limited);
        assert_eq!(zoom.extents(), limited);
    }

    #[test]
    fn actual_size_is_one_hundred_percent() {
        let mut zoom = ZoomController::new(document(), 1.5);
        let device = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(960.0, 640.0));
        zoom.zoom_to_actual_size(device, 96.0, layout().printable());
        // 960 px at 96 dpi is 10 in, or 1000 data units.
        assert!((zoom.extents().0 - 1000.0).abs() < 1e-9);
        let percent = zoom.zoom_percent(device, 96.0, layout().printable());
        assert!((percent - 100.0).abs() < 1e-9);
        assert!(ZoomController::antialias_at(percent));
        zoom.zoom_out();
        let percent = zoom.zoom_percent(device, 96.0, layout().printable());
        assert!((percent - 50.0).abs() < 1e-9);
        assert!(!ZoomController::antialias_at(percent));
    }

    #[test]
    fn derived_font_matches_across_screen_and_print() {
        let zoom = ZoomController::new(document(), 1000.0 / 750.0);
        let layout = layout();

        // Screen at 100%: 96 px per inch.
        let screen = RenderTarget::interactive(
            egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(960.0, 720.0)),
            96.0,
        );
        let t_screen = DeviceTransform::new(document(), screen.device);
        let s = zoom.derived_sizes(&screen, &t_screen, &layout);

        // Print at 300 dpi, full page.
        let print = RenderTarget::full_print(
            egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(3000.0, 2250.0)),
            300.0,
        );
        let t_print = DeviceTransform::new(document(), print.device);
        let p = zoom.derived_sizes(&print, &t_print, &layout);

        assert!((s.scale_ratio - 1.0).abs() < 1e-9);
        assert!((p.scale_ratio - 1.0).abs() < 1e-9);
        // Same proportion of the drawing width on both targets.
        let screen_prop = s.label_font as f64 / 960.0;
        let print_prop = p.label_font as f64 / 3000.0;
        assert!((screen_prop - print_prop).abs() < 1e-6);
        // 9 pt at 96 dpi is 12 px.
        assert!((s.label_font - 12.0).abs() < 1e-4);
        assert!((s.icon_diameter_data - zoom.icon_diameter_data(&layout)).abs() < 1e-6);
        assert!((p.icon_diameter_data - zoom.icon_diameter_data(&layout)).abs() < 1e-6);
    }

    #[test]
    fn panning_keeps_small_document_visible() {
        let mut zoom = ZoomController::new(document(), 1000.0 / 750.0);
        zoom.zoom_out();
        zoom.pan_by(10_000.0, 0.0);
        let view = zoom.view_rect();
        assert!(view.max_x >= 1000.0 - 1e-9);
        assert!(view.min_x <= 0.0 + 1e-9);

        // Zoomed in, the document exceeds the view and the view moves freely.
        let mut zoom = ZoomController::new(document(), 1000.0 / 750.0);
        zoom.zoom_in();
        let before = zoom.center();
        zoom.pan_by(40.0, -25.0);
        assert_eq!(zoom.center(), before.offset(40.0, -25.0));
    }

    #[test]
    fn resizing_reapplies_pan_limits() {
        let mut zoom = ZoomController::new(document(), 1000.0 / 750.0);
        zoom.zoom_in();
        // Zoomed in, the view may wander past the document edge.
        zoom.pan_by(0.0, 2000.0);
        assert!(zoom.view_rect().min_y > 750.0);

        // A tall window makes the view taller than the document.
        zoom.set_device_aspect(0.25);
        let view = zoom.view_rect();
        assert_eq!(zoom.extents(), (500.0, 2000.0));
        assert!(view.min_y <= 0.0 + 1e-9);
        assert!(view.max_y >= 750.0 - 1e-9);
    }
}
