//! The diagram engine: model, view state and edit history in one place.
//!
//! The implementation is split by concern, as separate `impl DiagramEngine`
//! blocks:
//! - `interaction.rs`: pointer and key handling
//! - `rendering.rs`: the render pipeline shared by all targets
//! - `history.rs`: undo and redo

mod history;
mod interaction;
mod rendering;

use crate::coords::{aspect_fit, device_aspect, DataRect, DeviceTransform};
use crate::diagram::DiagramModel;
use crate::error::{DiagramError, Result};
use crate::interaction::DragState;
use crate::network::NetworkModel;
use crate::render::{DiagramOverlay, Palette, RenderTarget};
use crate::settings::EngineSettings;
use crate::types::PageLayout;
use crate::undo::UndoHistory;
use crate::zoom::{ZoomController, ZoomOutcome};
use eframe::egui;
use std::rc::Rc;

/// Interactive diagram engine.
///
/// One instance backs the on-screen canvas. Print and export passes run
/// against a separate instance from [`DiagramEngine::for_printing`] so the
/// interactive selection, drag state and history are never touched.
pub struct DiagramEngine {
    model: DiagramModel,
    zoom: ZoomController,
    history: UndoHistory,
    drag: DragState,
    settings: EngineSettings,
    layout: PageLayout,
    viewport: egui::Rect,
    editable: bool,
    interactive: bool,
    overlays: Vec<Rc<dyn DiagramOverlay>>,
    palette: Palette,
    redraw_requested: bool,
}

impl std::fmt::Debug for DiagramEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramEngine")
            .field("layout", &self.layout.name)
            .field("viewport", &self.viewport)
            .field("drag", &self.drag.name())
            .field("editable", &self.editable)
            .field("interactive", &self.interactive)
            .field("overlays", &self.overlays.len())
            .finish()
    }
}

fn default_viewport() -> egui::Rect {
    egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))
}

impl DiagramEngine {
    /// Creates an interactive engine over `network`.
    ///
    /// # Errors
    ///
    /// [`DiagramError::LayoutNotFound`] if the network defines no page layouts.
    /// A layout named in `settings` that the network lacks falls back to the
    /// network's first layout.
    pub fn new(network: Box<dyn NetworkModel>, settings: EngineSettings) -> Result<Self> {
        let mut engine = Self::build(network, settings, true)?;
        engine.editable = true;
        log::info!(
            "diagram engine ready: {} nodes, layout \"{}\"",
            engine.model.order().len(),
            engine.layout.name
        );
        Ok(engine)
    }

    /// Creates an engine with no pointer or keyboard handling.
    pub fn new_headless(network: Box<dyn NetworkModel>, settings: EngineSettings) -> Result<Self> {
        Self::build(network, settings, false)
    }

    fn build(
        network: Box<dyn NetworkModel>,
        mut settings: EngineSettings,
        interactive: bool,
    ) -> Result<Self> {
        let layout = Self::initial_layout(network.as_ref(), &settings.layout)?;
        settings.layout = layout.name.clone();
        let model = DiagramModel::new(network);
        let viewport = default_viewport();
        let document = Self::document_for(&model, &layout);
        let mut engine = Self {
            model,
            zoom: ZoomController::new(document, device_aspect(viewport)),
            history: UndoHistory::new(),
            drag: DragState::Idle,
            settings,
            layout,
            viewport,
            editable: false,
            interactive,
            overlays: Vec::new(),
            palette: Palette::default(),
            redraw_requested: true,
        };
        engine.refresh_sizes();
        Ok(engine)
    }

    /// An isolated, non-editable copy for a print or export pass.
    ///
    /// The network is cloned; selection flags are cleared and the copy has no
    /// history or drag state.
    pub fn for_printing(&self) -> Self {
        let mut model = self.model.clone();
        model.clear_selection();
        let mut engine = Self {
            model,
            zoom: self.zoom.clone(),
            history: UndoHistory::new(),
            drag: DragState::Idle,
            settings: self.settings.clone(),
            layout: self.layout.clone(),
            viewport: self.viewport,
            editable: false,
            interactive: false,
            overlays: self.overlays.clone(),
            palette: self.palette,
            redraw_requested: false,
        };
        engine.refresh_sizes();
        engine
    }

    /// The named layout, or the network's first layout when it has none by that name.
    fn initial_layout(network: &dyn NetworkModel, name: &str) -> Result<PageLayout> {
        if let Some(layout) = network.layout(name) {
            return Ok(layout.clone());
        }
        let first = network
            .layouts()
            .first()
            .cloned()
            .ok_or_else(|| DiagramError::LayoutNotFound(name.to_string()))?;
        log::warn!("layout \"{name}\" not defined; using \"{}\"", first.name);
        Ok(first)
    }

    fn document_for(model: &DiagramModel, layout: &PageLayout) -> DataRect {
        let net = model.network();
        aspect_fit(net.bounds(), layout.printable().aspect(), net.edge_buffer())
    }

    /// Recomputes the icon diameter for the current layout and scale.
    fn refresh_sizes(&mut self) {
        let diameter = self.zoom.icon_diameter_data(&self.layout);
        self.model.set_icon_diameter(diameter);
    }

    /// Replaces the network, resetting view, selection and history.
    pub fn replace_network(&mut self, network: Box<dyn NetworkModel>) -> Result<()> {
        let layout = Self::initial_layout(network.as_ref(), &self.layout.name)?;
        self.model.replace_network(network);
        self.layout = layout;
        self.history.clear();
        self.drag = DragState::Idle;
        self.reset_document();
        Ok(())
    }

    fn reset_document(&mut self) {
        let document = Self::document_for(&self.model, &self.layout);
        self.zoom.set_document(document, device_aspect(self.viewport));
        self.refresh_sizes();
        self.request_redraw();
    }

    /// Selects a page layout by name.
    ///
    /// # Errors
    ///
    /// [`DiagramError::LayoutNotFound`] if the network has no such layout; the
    /// current layout is kept.
    pub fn set_layout(&mut self, name: &str) -> Result<()> {
        let layout = self
            .model
            .network()
            .layout(name)
            .cloned()
            .ok_or_else(|| DiagramError::LayoutNotFound(name.to_string()))?;
        log::debug!("page layout set to \"{name}\"");
        self.layout = layout;
        self.settings.layout = name.to_string();
        self.reset_document();
        Ok(())
    }

    /// The active page layout.
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Names of the layouts the network defines.
    pub fn layout_names(&self) -> Vec<String> {
        self.model
            .network()
            .layouts()
            .iter()
            .map(|l| l.name.clone())
            .collect()
    }

    /// The diagram model.
    pub fn model(&self) -> &DiagramModel {
        &self.model
    }

    /// The diagram model, mutable. Call [`DiagramEngine::topology_changed`]
    /// after adding, removing or renaming nodes through it.
    pub fn model_mut(&mut self) -> &mut DiagramModel {
        &mut self.model
    }

    /// Re-derives the document after the network topology or bounds changed.
    pub fn topology_changed(&mut self) {
        self.model.rebuild();
        self.reset_document();
    }

    /// The engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The engine settings, mutable. Changes take effect on the next frame.
    pub fn settings_mut(&mut self) -> &mut EngineSettings {
        self.request_redraw();
        &mut self.settings
    }

    /// Whether position edits and undo/redo are accepted.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Enables or disables editing.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Whether pointer and key input is handled.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// The active drag state.
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// The edit history.
    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    /// Sets the colors used for every target.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.request_redraw();
    }

    /// Registers a domain overlay drawn beneath the standard content.
    pub fn register_overlay(&mut self, overlay: Rc<dyn DiagramOverlay>) {
        self.overlays.push(overlay);
        self.request_redraw();
    }

    /// Full document rectangle in data units.
    pub fn document(&self) -> DataRect {
        self.zoom.document()
    }

    /// Sets the interactive canvas rectangle, keeping the view centered.
    pub fn set_viewport(&mut self, viewport: egui::Rect) {
        if viewport == self.viewport || viewport.width() <= 0.0 || viewport.height() <= 0.0 {
            return;
        }
        self.viewport = viewport;
        self.zoom.set_device_aspect(device_aspect(viewport));
        self.request_redraw();
    }

    /// The interactive canvas rectangle.
    pub fn viewport(&self) -> egui::Rect {
        self.viewport
    }

    /// Data to device mapping of the interactive canvas.
    pub fn transform(&self) -> DeviceTransform {
        DeviceTransform::new(self.zoom.view_rect(), self.viewport)
    }

    /// Render target for the interactive canvas at the current zoom.
    ///
    /// # Arguments
    ///
    /// * `pixels_per_point` - Physical pixels per egui point
    pub fn interactive_target(&self, pixels_per_point: f32) -> RenderTarget {
        let mut target = RenderTarget::interactive(self.viewport, self.settings.screen_dpi);
        target.pixels_per_unit = pixels_per_point;
        target.antialias = ZoomController::antialias_at(self.zoom_percent());
        target
    }

    /// The zoom controller.
    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    /// Current zoom as a percentage of printed size.
    pub fn zoom_percent(&self) -> f64 {
        self.zoom.zoom_percent(
            self.viewport,
            self.settings.screen_dpi,
            self.layout.printable(),
        )
    }

    fn after_zoom(&mut self, outcome: ZoomOutcome) -> ZoomOutcome {
        if outcome == ZoomOutcome::Changed {
            self.refresh_sizes();
            self.request_redraw();
            log::debug!("zoom now {:.0}%", self.zoom_percent());
        }
        outcome
    }

    /// Halves the visible extents.
    pub fn zoom_in(&mut self) -> ZoomOutcome {
        let outcome = self.zoom.zoom_in();
        self.after_zoom(outcome)
    }

    /// Doubles the visible extents.
    pub fn zoom_out(&mut self) -> ZoomOutcome {
        let outcome = self.zoom.zoom_out();
        self.after_zoom(outcome)
    }

    /// Shows the diagram at the size it prints.
    pub fn zoom_to_actual_size(&mut self) {
        self.zoom.zoom_to_actual_size(
            self.viewport,
            self.settings.screen_dpi,
            self.layout.printable(),
        );
        self.after_zoom(ZoomOutcome::Changed);
    }

    /// Shows the whole document.
    pub fn zoom_to_fit(&mut self) {
        self.zoom.fit_document(device_aspect(self.viewport));
        self.after_zoom(ZoomOutcome::Changed);
    }

    /// Asks the host to repaint.
    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Whether anything was moved since the last save.
    pub fn is_dirty(&self) -> bool {
        self.model.is_dirty()
    }

    /// Clears dirty flags after the network was saved.
    pub fn mark_saved(&mut self) {
        self.model.mark_clean();
    }
}

#[cfg(test)]
mod tests;
