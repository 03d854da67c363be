//! Undo/redo history of position edits.
//!
//! The history is a list of records and a cursor. Records before the cursor
//! have been applied; records at or after it can be redone. Recording a new edit
//! discards everything at or after the cursor.

use crate::constants::MAX_UNDO_HISTORY;
use crate::coords::DataPoint;
use crate::diagram::DiagramModel;

/// One node's part of a move.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMove {
    /// Id of the moved node
    pub node_id: String,
    /// Position before the move
    pub old: DataPoint,
    /// Position after the move
    pub new: DataPoint,
}

/// A single undoable edit.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoRecord {
    /// One or more nodes moved in a single gesture
    NodesMoved(Vec<NodeMove>),
    /// An annotation anchor moved
    AnnotationMoved {
        /// Index into the annotation list
        index: usize,
        /// Anchor before the move
        old: DataPoint,
        /// Anchor after the move
        new: DataPoint,
    },
    /// The legend anchor moved
    LegendMoved {
        /// Anchor before the move
        old: DataPoint,
        /// Anchor after the move
        new: DataPoint,
    },
}

/// Linear undo history with truncate-on-write.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    records: Vec<UndoRecord>,
    cursor: usize,
}

impl UndoHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new edit, discarding any records that could have been redone.
    pub fn record(&mut self, record: UndoRecord) {
        self.records.truncate(self.cursor);
        self.records.push(record);
        if self.records.len() > MAX_UNDO_HISTORY {
            self.records.remove(0);
        }
        self.cursor = self.records.len();
    }

    /// Steps back one record.
    ///
    /// # Returns
    ///
    /// The record whose old positions must be applied, or `None` at the start.
    pub fn undo(&mut self) -> Option<&UndoRecord> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.records.get(self.cursor)
    }

    /// Steps forward one record.
    ///
    /// # Returns
    ///
    /// The record whose new positions must be applied, or `None` at the end.
    pub fn redo(&mut self) -> Option<&UndoRecord> {
        let record = self.records.get(self.cursor)?;
        self.cursor += 1;
        Some(record)
    }

    /// Returns true if there are records that can be undone.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there are records that can be redone.
    pub fn can_redo(&self) -> bool {
        self.cursor < self.records.len()
    }

    /// Position of the cursor, always within `0..=len()`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the history holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clears all undo and redo history.
    pub fn clear(&mut self) {
        self.records.clear();
        self.cursor = 0;
    }
}

/// Which side of a record to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply old positions
    Undo,
    /// Apply new positions
    Redo,
}

/// Extension methods for applying undo records to a diagram.
pub trait UndoableDiagram {
    /// Applies one side of `record`. Entities that no longer exist are skipped.
    fn apply_record(&mut self, record: &UndoRecord, direction: Direction);
}

impl UndoableDiagram for DiagramModel {
    fn apply_record(&mut self, record: &UndoRecord, direction: Direction) {
        let pick = |old: DataPoint, new: DataPoint| match direction {
            Direction::Undo => old,
            Direction::Redo => new,
        };
        match record {
            UndoRecord::NodesMoved(moves) => {
                for m in moves {
                    if let Some(index) = self.find_node(&m.node_id) {
                        if let Some(node) = self.node_mut(index) {
                            node.position = pick(m.old, m.new);
                            node.dirty = true;
                        }
                    }
                }
            }
            UndoRecord::AnnotationMoved { index, old, new } => {
                if let Some(a) = self.annotations_mut().get_mut(*index) {
                    a.anchor = pick(*old, *new);
                    a.dirty = true;
                }
            }
            UndoRecord::LegendMoved { old, new } => {
                let legend = self.legend_mut();
                legend.anchor = pick(*old, *new);
                legend.dirty = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legend_move(i: f64) -> UndoRecord {
        UndoRecord::LegendMoved {
            old: DataPoint::new(i, 0.0),
            new: DataPoint::new(i + 1.0, 0.0),
        }
    }

    #[test]
    fn undo_and_redo_are_noops_at_the_ends() {
        let mut history = UndoHistory::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        history.record(legend_move(0.0));
        assert!(history.redo().is_none());
        assert_eq!(history.cursor(), 1);
        assert!(history.undo().is_some());
        assert!(history.undo().is_none());
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn recording_after_undo_discards_forward_records() {
        let mut history = UndoHistory::new();
        for i in 0..5 {
            history.record(legend_move(i as f64));
        }
        history.undo();
        history.undo();
        assert!(history.can_redo());
        history.record(legend_move(10.0));
        assert_eq!(history.len(), 4);
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.undo(), Some(&legend_move(10.0)));
    }

    #[test]
    fn history_is_bounded() {
        let mut history = UndoHistory::new();
        for i in 0..(MAX_UNDO_HISTORY + 10) {
            history.record(legend_move(i as f64));
        }
        assert_eq!(history.len(), MAX_UNDO_HISTORY);
        assert_eq!(history.cursor(), MAX_UNDO_HISTORY);
    }
}
