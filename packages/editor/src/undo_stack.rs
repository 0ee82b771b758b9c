//! # History
//!
//! One entry per user action. An entry snapshots the document and selection on
//! both sides of the action; post-effect follow-ups are already applied when
//! the entry is recorded, so they never form a level of their own.
//!
//! Recording drops the redo branch. Batches collapse every edit recorded
//! between `begin_batch` and `end_batch` into a single level.

use postcraft_model::{Document, Origin, Selection};

/// Document state on both sides of one undoable edit
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub before: Document,
    pub before_selection: Selection,
    pub after: Document,
    pub after_selection: Selection,
    pub origin: Origin,

    /// Label shown in history menus
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(
        before: Document,
        before_selection: Selection,
        after: Document,
        after_selection: Selection,
    ) -> Self {
        Self {
            before,
            before_selection,
            after,
            after_selection,
            origin: Origin::default(),
            description: None,
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

/// Bounded undo and redo levels
#[derive(Debug)]
pub struct UndoStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,

    /// 0 keeps every level
    max_levels: usize,
    current_batch: Option<Batch>,
}

#[derive(Debug, Default)]
struct Batch {
    entry: Option<HistoryEntry>,
    description: Option<String>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record a committed edit
    pub fn record(&mut self, entry: HistoryEntry) {
        if let Some(batch) = &mut self.current_batch {
            match &mut batch.entry {
                Some(open) => {
                    open.after = entry.after;
                    open.after_selection = entry.after_selection;
                }
                None => batch.entry = Some(entry),
            }
            return;
        }
        self.push_entry(entry);
    }

    /// Collapse subsequent records into one level until `end_batch`
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(Batch::default());
    }

    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if let Some(mut entry) = batch.entry {
                if batch.description.is_some() {
                    entry.description = batch.description;
                }
                self.push_entry(entry);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent entry, restoring its before-state
    pub fn undo(&mut self, doc: &mut Document, selection: &mut Selection) -> bool {
        match self.undo_stack.pop() {
            Some(entry) => {
                *doc = entry.before.clone();
                *selection = entry.before_selection;
                self.redo_stack.push(entry);
                true
            }
            None => false,
        }
    }

    /// Redo the most recently undone entry
    pub fn redo(&mut self, doc: &mut Document, selection: &mut Selection) -> bool {
        match self.redo_stack.pop() {
            Some(entry) => {
                *doc = entry.after.clone();
                *selection = entry.after_selection;
                self.undo_stack.push(entry);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the level `undo` would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
