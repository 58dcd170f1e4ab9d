//! Bounded undo/redo history of annotation snapshots.

use crate::annotation::Annotation;
use crate::store::AnnotationStore;

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// A deep copy of the annotation sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    annotations: Vec<Annotation>,
}

impl HistorySnapshot {
    pub fn capture(store: &AnnotationStore) -> Self {
        Self {
            annotations: store.annotations().to_vec(),
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Write this snapshot back into `store`.
    pub fn restore(&self, store: &mut AnnotationStore) {
        store.replace_all(self.annotations.clone());
    }
}

/// Linear snapshot history with a cursor.
///
/// `snapshots[cursor]` is the state the store currently corresponds to.
/// Saving truncates everything after the cursor, so a new edit after an undo
/// discards the redo tail.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    snapshots: Vec<HistorySnapshot>,
    cursor: usize,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    /// Create an empty history. A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record the current store content.
    pub fn save_state(&mut self, store: &AnnotationStore) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(HistorySnapshot::capture(store));
        if self.snapshots.len() > self.capacity {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. Returns `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    /// Step forward one snapshot. Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.snapshots.get(self.cursor)
    }

    pub fn snapshots(&self) -> &[HistorySnapshot] {
        &self.snapshots
    }
}
