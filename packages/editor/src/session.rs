//! # Edit Session
//!
//! Owns one document and everything that changes with it: selection, undo
//! history, tracked placeholders and the post-commit pass.
//!
//! ## Dispatch
//!
//! Every change enters through [`EditorSession::dispatch`]:
//!
//! 1. The transaction is checked against the current document
//! 2. Document and selection are replaced, tracked placeholders are mapped
//! 3. Post-effects run on the committed document; each follow-up is applied
//!    the same way
//! 4. One history entry covers the change and all of its follow-ups

use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::input_rules::InputRules;
use crate::placeholders::PlaceholderTracker;
use crate::post_effects::{enforce_link_color, PostEffectEngine};
use crate::undo_stack::{HistoryEntry, UndoStack};
use postcraft_model::{Document, Mapping, Node, Origin, Selection, Transaction};
use postcraft_schema::extensions::PLACEHOLDER_ID;
use postcraft_schema::{AttributeUpdate, AttributeUpdater, NodeViewDescriptor, Schema};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Upper bound on chained post-effect rounds per dispatch
const MAX_EFFECT_ROUNDS: usize = 8;

/// Single-writer editing session over one document
#[derive(Debug)]
pub struct EditorSession {
    pub(crate) schema: Arc<Schema>,
    pub(crate) doc: Document,
    pub(crate) selection: Selection,
    pub(crate) history: UndoStack,
    pub(crate) effects: PostEffectEngine,
    pub(crate) input_rules: InputRules,
    pub(crate) placeholders: PlaceholderTracker,
    config: EditorConfig,
}

impl EditorSession {
    /// Create a session with the default configuration
    pub fn new(schema: Arc<Schema>, doc: Document) -> Self {
        Self::with_config(schema, doc, EditorConfig::default())
    }

    pub fn with_config(schema: Arc<Schema>, doc: Document, config: EditorConfig) -> Self {
        let effects = if config.enforce_link_color {
            PostEffectEngine::new()
        } else {
            PostEffectEngine::empty()
        };
        let input_rules = if config.input_rules {
            InputRules::new()
        } else {
            InputRules::empty()
        };

        let mut placeholders = PlaceholderTracker::new();
        placeholders.resync(&doc);

        Self {
            schema,
            doc,
            selection: Selection::default(),
            history: UndoStack::with_max_levels(config.history_depth),
            effects,
            input_rules,
            placeholders,
            config,
        }
    }

    /// Load a persisted post
    #[instrument(skip_all, fields(len = markup.len()))]
    pub fn from_markup(
        schema: Arc<Schema>,
        markup: &str,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        let doc = postcraft_markup::parse(markup, &schema)?;
        Ok(Self::with_config(schema, doc, config))
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Replace the selection, clamped to the document
    pub fn set_selection(&mut self, selection: Selection) {
        let size = self.doc.size();
        self.selection = match selection {
            Selection::Text { anchor, head } => Selection::text(anchor.min(size), head.min(size)),
            Selection::Node { from, to } if to <= size && from < to => selection,
            other => Selection::cursor(other.from().min(size)),
        };
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn input_rules_mut(&mut self) -> &mut InputRules {
        &mut self.input_rules
    }

    pub fn effects_mut(&mut self) -> &mut PostEffectEngine {
        &mut self.effects
    }

    /// Start a transaction against the current document
    pub fn transaction(&self) -> Transaction {
        Transaction::new(&self.doc)
    }

    /// Commit a transaction and run the post-commit pass
    pub fn dispatch(&mut self, tr: Transaction) -> Result<(), EditorError> {
        self.commit(tr).map(|_| ())
    }

    /// Dispatch, returning how the follow-ups moved positions taken after
    /// `tr` itself
    #[instrument(skip_all, fields(origin = ?tr.origin(), steps = tr.steps().len()))]
    pub(crate) fn commit(&mut self, tr: Transaction) -> Result<Mapping, EditorError> {
        if tr.before() != &self.doc {
            return Err(EditorError::StaleTransaction);
        }

        let before = self.doc.clone();
        let before_selection = self.selection;
        let changed = tr.doc_changed();
        let mut follow_up_map = Mapping::new();

        self.apply(&tr);

        if changed {
            let mut trigger = tr.clone();
            let mut rounds = 0;
            loop {
                if rounds == MAX_EFFECT_ROUNDS {
                    warn!(rounds, "Post-effects did not settle");
                    break;
                }
                let mut follow_ups = self.effects.run(&trigger, &self.doc, &self.schema)?;
                let Some(last) = follow_ups.pop() else {
                    break;
                };
                for follow_up in &follow_ups {
                    self.apply(follow_up);
                    follow_up_map.append(follow_up.mapping());
                }
                self.apply(&last);
                follow_up_map.append(last.mapping());
                trigger = last;
                rounds += 1;
            }

            if tr.add_to_history() {
                self.history.record(
                    HistoryEntry::new(before, before_selection, self.doc.clone(), self.selection)
                        .with_origin(tr.origin()),
                );
            }
            debug!(size = self.doc.size(), "Committed change");
        }

        Ok(follow_up_map)
    }

    fn apply(&mut self, tr: &Transaction) {
        let size = tr.doc().size();
        self.selection = tr
            .selection()
            .unwrap_or_else(|| self.selection.map(tr.mapping(), size));
        self.placeholders.map_through(tr.mapping());
        self.doc = tr.doc().clone();
    }

    /// Revert the most recent history entry
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.doc, &mut self.selection);
        if undone {
            self.placeholders.resync(&self.doc);
            debug!(levels = self.history.undo_levels(), "Undo");
        }
        undone
    }

    /// Reapply the most recently undone entry
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.doc, &mut self.selection);
        if redone {
            self.placeholders.resync(&self.doc);
            debug!(levels = self.history.redo_levels(), "Redo");
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Group following dispatches into one undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// View descriptors for every node type that declares a view
    pub fn node_views(&self) -> Vec<NodeViewDescriptor> {
        let mut views = Vec::new();
        self.doc.descendants(|node, pos| {
            if let Node::Element(el) = node {
                if let Some(factory) = self.schema.node_spec(&el.type_name).and_then(|s| s.view.as_ref()) {
                    views.push(factory.create(el, AttributeUpdater::new(pos, el.type_name.clone())));
                }
            }
            true
        });
        views
    }

    /// Apply an attribute change requested by a node view.
    ///
    /// Returns `false` when the addressed node is gone or of another type, or
    /// when the merged attributes equal the current ones. A placeholder's id
    /// is never taken from the patch.
    pub fn update_attributes(&mut self, mut update: AttributeUpdate) -> Result<bool, EditorError> {
        let Some(el) = self.doc.element_at(update.pos) else {
            return Ok(false);
        };
        if el.type_name != update.type_name {
            debug!(pos = update.pos, expected = %update.type_name, found = %el.type_name, "Stale attribute update");
            return Ok(false);
        }

        // Placeholder identity belongs to the session
        if update.patch.remove(PLACEHOLDER_ID).is_some() {
            debug!(pos = update.pos, "Ignoring placeholder id in attribute update");
        }

        let mut merged = el.attrs.clone();
        merged.extend(update.patch);
        let attrs = self.schema.normalize_attrs(&el.type_name, &merged)?;
        if attrs == el.attrs {
            return Ok(false);
        }

        let mut tr = self.transaction();
        tr.set_node_attrs(update.pos, attrs)?;
        tr.set_origin(Origin::User);
        self.dispatch(tr)?;
        Ok(true)
    }

    /// Run the link/color pass over the whole document outside history.
    ///
    /// Used for documents loaded from storage, which never went through
    /// `dispatch`.
    pub fn enforce_invariants(&mut self) -> Result<bool, EditorError> {
        let Some(mut tr) = enforce_link_color(&self.doc, &self.schema)? else {
            return Ok(false);
        };
        tr.set_add_to_history(false);
        self.apply(&tr);
        Ok(true)
    }

    /// Persisted form of the current document
    pub fn to_markup(&self) -> String {
        postcraft_markup::serialize(&self.doc, &self.schema)
    }

    /// End the session, discarding unresolved placeholders
    pub fn close(mut self) -> Result<Document, EditorError> {
        self.abandon_placeholders()?;
        Ok(self.doc)
    }
}
