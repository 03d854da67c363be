//! Interaction state for the diagram canvas.
//!
//! Exactly one gesture can be active at a time; [`DragState`] makes that
//! explicit. Transitions live on the engine (`engine/interaction.rs`).

use crate::coords::{DataPoint, DataRect};
use eframe::egui;
use serde::{Deserialize, Serialize};

/// What a pointer-down on empty canvas does.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Start a rubber-band selection
    #[default]
    Select,
    /// Pan the view
    Pan,
}

/// Starting position of one node in a node drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStart {
    /// Storage index of the node
    pub index: usize,
    /// Position when the drag began
    pub position: DataPoint,
}

/// The active pointer gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    /// No gesture in progress
    #[default]
    Idle,
    /// Panning the view
    Panning {
        /// Pointer position at the previous move, in device units
        last: egui::Pos2,
    },
    /// Dragging one or more selected nodes
    DraggingNodes {
        /// Storage index of the node under the pointer
        primary: usize,
        /// Start positions of every selected node, the primary first
        starts: Vec<DragStart>,
        /// Pointer position at the press, in data units
        pressed_at: DataPoint,
        /// Content bounds when the drag began
        bounds: DataRect,
    },
    /// Dragging the legend
    DraggingLegend {
        /// Anchor when the drag began
        start: DataPoint,
        /// Pointer position at the press, in data units
        pressed_at: DataPoint,
        /// Content bounds when the drag began
        bounds: DataRect,
    },
    /// Dragging an annotation
    DraggingAnnotation {
        /// Index of the annotation
        index: usize,
        /// Anchor when the drag began
        start: DataPoint,
        /// Pointer position at the press, in data units
        pressed_at: DataPoint,
        /// Content bounds when the drag began
        bounds: DataRect,
    },
    /// Rubber-band selection
    RubberBand {
        /// Pointer-down position in device units
        origin: egui::Pos2,
        /// Current pointer position in device units
        current: egui::Pos2,
    },
}

impl DragState {
    /// Whether no gesture is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    /// Whether the legend is being dragged.
    pub fn is_dragging_legend(&self) -> bool {
        matches!(self, DragState::DraggingLegend { .. })
    }

    /// Index of the annotation being dragged, if any.
    pub fn dragged_annotation(&self) -> Option<usize> {
        match self {
            DragState::DraggingAnnotation { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Short name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            DragState::Idle => "idle",
            DragState::Panning { .. } => "panning",
            DragState::DraggingNodes { .. } => "dragging nodes",
            DragState::DraggingLegend { .. } => "dragging legend",
            DragState::DraggingAnnotation { .. } => "dragging annotation",
            DragState::RubberBand { .. } => "rubber band",
        }
    }
}

/// Rounds `p` to the nearest grid intersection.
pub fn snap_to_grid(p: DataPoint, spacing: f64) -> DataPoint {
    if spacing <= 0.0 {
        return p;
    }
    DataPoint::new(
        (p.x / spacing).round() * spacing,
        (p.y / spacing).round() * spacing,
    )
}

/// Moves `v` toward `[lo, hi]` by at most `reach`.
fn toward(v: f64, lo: f64, hi: f64, reach: f64) -> f64 {
    if v < lo {
        (v + reach).min(lo)
    } else if v > hi {
        (v - reach).max(hi)
    } else {
        v
    }
}

/// Whether a node at `p` with icon radius `half` is caught by a rubber band.
///
/// The node counts when its position is inside `rect`, or when moving it by up
/// to `half` toward the rectangle on each axis brings it inside.
pub fn rubber_band_contains(rect: &DataRect, p: DataPoint, half: f64) -> bool {
    let q = DataPoint::new(
        toward(p.x, rect.min_x, rect.max_x, half),
        toward(p.y, rect.min_y, rect.max_y, half),
    );
    rect.contains(q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_rounds_to_nearest_intersection() {
        let p = snap_to_grid(DataPoint::new(29.0, -31.0), 20.0);
        assert_eq!(p, DataPoint::new(20.0, -40.0));
        let p = snap_to_grid(DataPoint::new(-9.0, 10.0), 20.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y.abs(), 20.0);
        assert_eq!(snap_to_grid(DataPoint::new(3.0, 4.0), 0.0), DataPoint::new(3.0, 4.0));
    }

    #[test]
    fn rubber_band_uses_half_diameter_reach() {
        let rect = DataRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rubber_band_contains(&rect, DataPoint::new(5.0, 5.0), 0.0));
        assert!(rubber_band_contains(&rect, DataPoint::new(12.0, 5.0), 2.0));
        assert!(!rubber_band_contains(&rect, DataPoint::new(12.5, 5.0), 2.0));
        assert!(rubber_band_contains(&rect, DataPoint::new(-1.0, 11.0), 1.5));
    }

    #[test]
    fn drag_state_queries() {
        assert!(DragState::default().is_idle());
        let s = DragState::DraggingAnnotation {
            index: 3,
            start: DataPoint::default(),
            pressed_at: DataPoint::default(),
            bounds: DataRect::default(),
        };
        assert_eq!(s.dragged_annotation(), Some(3));
        assert!(!s.is_dragging_legend());
        assert_eq!(s.name(), "dragging annotation");
    }
}
