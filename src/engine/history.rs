//! Undo and redo of position edits.

use super::DiagramEngine;
use crate::undo::{Direction, UndoRecord, UndoableDiagram};

impl DiagramEngine {
    /// Reverts the most recent edit.
    ///
    /// # Returns
    ///
    /// `true` if an edit was reverted; `false` at the start of the history or
    /// while the engine is not editable.
    pub fn undo(&mut self) -> bool {
        self.step(Direction::Undo)
    }

    /// Re-applies the most recently reverted edit.
    ///
    /// # Returns
    ///
    /// `true` if an edit was re-applied; `false` at the end of the history or
    /// while the engine is not editable.
    pub fn redo(&mut self) -> bool {
        self.step(Direction::Redo)
    }

    /// Whether [`DiagramEngine::undo`] would do anything.
    pub fn can_undo(&self) -> bool {
        self.editable && self.history.can_undo()
    }

    /// Whether [`DiagramEngine::redo`] would do anything.
    pub fn can_redo(&self) -> bool {
        self.editable && self.history.can_redo()
    }

    fn step(&mut self, direction: Direction) -> bool {
        if !self.editable {
            log::debug!("{direction:?} ignored: diagram is not editable");
            return false;
        }
        if !self.drag.is_idle() {
            self.cancel_drag();
        }
        let record = match direction {
            Direction::Undo => self.history.undo(),
            Direction::Redo => self.history.redo(),
        };
        let Some(record) = record else {
            return false;
        };
        self.model.apply_record(record, direction);
        log::debug!(
            "{direction:?} applied, cursor {}/{}",
            self.history.cursor(),
            self.history.len()
        );
        self.request_redraw();
        true
    }

    /// Appends an edit to the history.
    pub(super) fn record(&mut self, record: UndoRecord) {
        self.history.record(record);
        self.request_redraw();
    }
}
