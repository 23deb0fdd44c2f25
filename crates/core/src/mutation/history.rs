//! # Undo/Redo History
//!
//! Whole-document snapshots rather than inverse operations: every field is
//! restored exactly, including ones an edit forgot to touch. Snapshots are
//! `Arc`s, so recording one is a reference-count bump.
//!
//! - A new edit records the previous document and clears the redo stack
//! - The undo stack keeps the most recent [`HISTORY_LIMIT`] entries,
//!   evicting the oldest first

use std::collections::VecDeque;
use std::sync::Arc;

use crate::document::model::Document;

/// Maximum number of undo levels.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug)]
pub struct History {
    /// Oldest at the front.
    undo_stack: VecDeque<Arc<Document>>,
    /// Most recent last.
    redo_stack: Vec<Arc<Document>>,
    limit: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(limit.min(HISTORY_LIMIT)),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// Record the document an edit is about to replace.
    pub fn record(&mut self, previous: Arc<Document>) {
        self.push_undo(previous);
        self.redo_stack.clear();
    }

    /// Step back: `current` moves to the redo stack and the most recent
    /// snapshot is returned.
    pub fn undo(&mut self, current: Arc<Document>) -> Option<Arc<Document>> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward: `current` moves back onto the undo stack.
    pub fn redo(&mut self, current: Arc<Document>) -> Option<Arc<Document>> {
        let next = self.redo_stack.pop()?;
        self.push_undo(current);
        Some(next)
    }

    fn push_undo(&mut self, snapshot: Arc<Document>) {
        if self.limit == 0 {
            return;
        }
        if self.undo_stack.len() == self.limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(snapshot);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
