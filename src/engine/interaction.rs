//! Pointer and keyboard handling for the interactive canvas.
//!
//! Positions arrive in device units and are converted through the current
//! view transform. Edits are committed (clamped and recorded) on release.

use super::DiagramEngine;
use crate::coords::{DataPoint, DataRect};
use crate::diagram::Hit;
use crate::interaction::{rubber_band_contains, snap_to_grid, DragStart, DragState, InteractionMode};
use crate::undo::{NodeMove, UndoRecord};
use eframe::egui;

impl DiagramEngine {
    /// Handles a primary-button press on the canvas.
    ///
    /// # Arguments
    ///
    /// * `pos` - Pointer position in device units
    /// * `modifiers` - Held modifier keys; Shift toggles node selection,
    ///   Ctrl/Cmd starts a pan
    pub fn pointer_down(&mut self, pos: egui::Pos2, modifiers: egui::Modifiers) {
        if !self.interactive || !self.drag.is_idle() {
            return;
        }
        if modifiers.command {
            self.start_pan(pos);
            return;
        }

        let p = self.transform().device_to_data(pos);
        let hit = if self.editable { self.model.hit_test(p) } else { None };
        let bounds = self.model.data_bounds();

        self.drag = match hit {
            Some(Hit::Node(index)) if modifiers.shift => {
                if let Some(node) = self.model.node_mut(index) {
                    node.selected = !node.selected;
                }
                self.request_redraw();
                return;
            }
            Some(Hit::Node(index)) => {
                let Some(primary) = self.model.node(index).map(|n| (n.selected, n.position)) else {
                    return;
                };
                if !primary.0 {
                    self.model.clear_selection();
                    if let Some(node) = self.model.node_mut(index) {
                        node.selected = true;
                    }
                }
                let mut starts = vec![DragStart {
                    index,
                    position: primary.1,
                }];
                starts.extend(
                    self.model
                        .selected_nodes()
                        .into_iter()
                        .filter(|&i| i != index)
                        .filter_map(|i| {
                            self.model.node(i).map(|n| DragStart {
                                index: i,
                                position: n.position,
                            })
                        }),
                );
                DragState::DraggingNodes {
                    primary: index,
                    pressed_at: p,
                    starts,
                    bounds,
                }
            }
            Some(Hit::Annotation(index)) => {
                self.model.clear_selection();
                let Some(a) = self.model.annotations_mut().get_mut(index) else {
                    return;
                };
                a.selected = true;
                DragState::DraggingAnnotation {
                    index,
                    start: a.anchor,
                    pressed_at: p,
                    bounds,
                }
            }
            Some(Hit::Legend) => {
                let start = self.model.legend().anchor;
                DragState::DraggingLegend {
                    start,
                    pressed_at: p,
                    bounds,
                }
            }
            None => {
                if !modifiers.shift {
                    self.model.clear_selection();
                }
                match self.settings.mode {
                    InteractionMode::Select => DragState::RubberBand {
                        origin: pos,
                        current: pos,
                    },
                    InteractionMode::Pan => DragState::Panning { last: pos },
                }
            }
        };
        log::debug!("pointer down at {p:?}: {}", self.drag.name());
        self.request_redraw();
    }

    /// Starts panning regardless of the interaction mode (middle button or
    /// Ctrl/Cmd drag).
    pub fn start_pan(&mut self, pos: egui::Pos2) {
        if self.interactive && self.drag.is_idle() {
            self.drag = DragState::Panning { last: pos };
        }
    }

    /// Handles pointer motion while a gesture is active.
    pub fn pointer_move(&mut self, pos: egui::Pos2) {
        if !self.interactive || self.drag.is_idle() {
            return;
        }
        let transform = self.transform();
        let p = transform.device_to_data(pos);
        let (snapping, spacing) = (self.settings.snap_to_grid, self.settings.grid_spacing);
        let snap = |q: DataPoint| if snapping { snap_to_grid(q, spacing) } else { q };

        match &mut self.drag {
            DragState::Idle => return,
            DragState::Panning { last } => {
                let (dx, dy) = transform.delta_to_data(pos - *last);
                *last = pos;
                self.zoom.pan_by(-dx, -dy);
            }
            DragState::RubberBand { current, .. } => *current = pos,
            DragState::DraggingNodes {
                starts, pressed_at, ..
            } => {
                let (mx, my) = p.delta_from(*pressed_at);
                let candidate = snap(starts[0].position.offset(mx, my));
                // Every node moves by the primary's delta; only the primary snaps.
                let (dx, dy) = candidate.delta_from(starts[0].position);
                for s in starts.iter() {
                    if let Some(node) = self.model.node_mut(s.index) {
                        node.position = s.position.offset(dx, dy);
                    }
                }
            }
            DragState::DraggingLegend {
                start, pressed_at, ..
            } => {
                let (mx, my) = p.delta_from(*pressed_at);
                self.model.legend_mut().anchor = start.offset(mx, my);
            }
            DragState::DraggingAnnotation {
                index,
                start,
                pressed_at,
                ..
            } => {
                let (mx, my) = p.delta_from(*pressed_at);
                let anchor = snap(start.offset(mx, my));
                if let Some(a) = self.model.annotations_mut().get_mut(*index) {
                    a.anchor = anchor;
                }
            }
        }
        self.request_redraw();
    }

    /// Handles release of the pointer, committing the active gesture.
    pub fn pointer_up(&mut self, pos: egui::Pos2) {
        if !self.interactive {
            return;
        }
        self.pointer_move(pos);
        let drag = std::mem::take(&mut self.drag);
        match drag {
            DragState::Idle | DragState::Panning { .. } => {}
            DragState::DraggingNodes {
                primary,
                starts,
                bounds,
                ..
            } => self.commit_node_drag(primary, &starts, bounds),
            DragState::DraggingLegend { start, bounds, .. } => {
                let legend = self.model.legend();
                let (w, h) = legend
                    .bounds
                    .map(|b| (b.width(), b.height()))
                    .unwrap_or((0.0, 0.0));
                let a = legend.anchor;
                let clamped = DataPoint::new(
                    a.x.clamp(bounds.min_x, (bounds.max_x - w).max(bounds.min_x)),
                    a.y.clamp(bounds.min_y, (bounds.max_y - h).max(bounds.min_y)),
                );
                let legend = self.model.legend_mut();
                legend.anchor = clamped;
                if clamped != start {
                    legend.dirty = true;
                    self.record(UndoRecord::LegendMoved {
                        old: start,
                        new: clamped,
                    });
                }
            }
            DragState::DraggingAnnotation {
                index,
                start,
                bounds,
                ..
            } => {
                let Some(a) = self.model.annotations_mut().get_mut(index) else {
                    return;
                };
                let (hw, hh) = a
                    .bounds
                    .map(|b| (b.width() / 2.0, b.height() / 2.0))
                    .unwrap_or((0.0, 0.0));
                a.anchor = bounds.clamp_point(a.anchor, hw, hh);
                let new = a.anchor;
                if new != start {
                    a.dirty = true;
                    self.record(UndoRecord::AnnotationMoved {
                        index,
                        old: start,
                        new,
                    });
                }
            }
            DragState::RubberBand { origin, current } => {
                let rect = self
                    .transform()
                    .rect_to_data(egui::Rect::from_two_pos(origin, current));
                let half = self.model.icon_diameter() / 2.0;
                for index in self.model.order().to_vec() {
                    if let Some(node) = self.model.node_mut(index) {
                        node.selected = rubber_band_contains(&rect, node.position, half);
                    }
                }
                for a in self.model.annotations_mut() {
                    a.selected = false;
                }
            }
        }
        self.request_redraw();
    }

    /// Clamps the primary node into the drag-start bounds, shifts the rest of
    /// the group by the same correction and records one history entry.
    fn commit_node_drag(&mut self, primary: usize, starts: &[DragStart], bounds: DataRect) {
        let half = self.model.icon_diameter() / 2.0;
        let Some(current) = self.model.node(primary).map(|n| n.position) else {
            return;
        };
        let clamped = bounds.clamp_point(current, half, half);
        let (cx, cy) = clamped.delta_from(current);

        let mut moves = Vec::with_capacity(starts.len());
        for s in starts {
            let Some(node) = self.model.node_mut(s.index) else {
                continue;
            };
            node.position = node.position.offset(cx, cy);
            if node.position != s.position {
                node.dirty = true;
                moves.push(NodeMove {
                    node_id: node.id.clone(),
                    old: s.position,
                    new: node.position,
                });
            }
        }
        if !moves.is_empty() {
            log::debug!("moved {} node(s)", moves.len());
            self.record(UndoRecord::NodesMoved(moves));
        }
    }

    /// Aborts the active drag, restoring every dragged item. Nothing is recorded.
    pub fn cancel_drag(&mut self) {
        match std::mem::take(&mut self.drag) {
            DragState::DraggingNodes { starts, .. } => {
                for s in starts {
                    if let Some(node) = self.model.node_mut(s.index) {
                        node.position = s.position;
                    }
                }
            }
            DragState::DraggingLegend { start, .. } => self.model.legend_mut().anchor = start,
            DragState::DraggingAnnotation { index, start, .. } => {
                if let Some(a) = self.model.annotations_mut().get_mut(index) {
                    a.anchor = start;
                }
            }
            DragState::Idle => return,
            DragState::Panning { .. } | DragState::RubberBand { .. } => {}
        }
        log::debug!("drag cancelled");
        self.request_redraw();
    }

    /// Handles a key press on the canvas.
    ///
    /// # Returns
    ///
    /// `true` if the key was consumed.
    pub fn key_pressed(&mut self, key: egui::Key, modifiers: egui::Modifiers) -> bool {
        if !self.interactive {
            return false;
        }
        match key {
            egui::Key::Escape if !self.drag.is_idle() => {
                self.cancel_drag();
                true
            }
            egui::Key::Z if modifiers.command && modifiers.shift => self.redo(),
            egui::Key::Z if modifiers.command => self.undo(),
            egui::Key::Y if modifiers.command => self.redo(),
            egui::Key::Plus | egui::Key::Equals => {
                self.zoom_in();
                true
            }
            egui::Key::Minus => {
                self.zoom_out();
                true
            }
            egui::Key::Num0 if modifiers.command => {
                self.zoom_to_actual_size();
                true
            }
            _ => false,
        }
    }

    /// Selects only the node with `id`, if it exists.
    pub fn select_node(&mut self, id: &str) -> bool {
        let Some(index) = self.model.find_node(id) else {
            return false;
        };
        self.model.clear_selection();
        if let Some(node) = self.model.node_mut(index) {
            node.selected = true;
        }
        self.request_redraw();
        true
    }
}
