//! # Placeholder Resolution
//!
//! A placeholder block is inserted synchronously while the host runs an
//! asynchronous lookup (file picker, URL metadata fetch, place search). When
//! the lookup completes the placeholder is replaced, at its current position,
//! by the final node.
//!
//! ## Lifecycle
//!
//! ```text
//! inserted ──begin_input──▶ awaiting-input ──supply_result──▶ resolved
//!     │                          │
//!     └──────────cancel──────────┴──────────────────────────▶ cancelled
//! ```
//!
//! The session maps each tracked position through every committed change. A
//! change that deletes the placeholder drops it from tracking, so a late
//! result is discarded instead of being inserted somewhere else. Before
//! replacing, the node at the mapped position is checked for the expected
//! type and `placeholderId`.

use crate::commands::block_insert_position;
use crate::errors::EditorError;
use crate::session::EditorSession;
use postcraft_model::{attrs, Assoc, Document, Element, Mapping, Node, Origin, Selection};
use postcraft_schema::extensions::{
    GalleryImage, GeoPoint, MediaRecord, PlaceholderKind, UrlMetadata, GALLERY, GEOLOCATION,
    PLACEHOLDER_ID, URL_EMBED,
};
use postcraft_schema::{Schema, SchemaError};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Session-local placeholder identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaceholderId(u64);

impl PlaceholderId {
    pub fn get(self) -> u64 {
        self.0
    }

    fn attr_value(self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderState {
    Inserted,
    AwaitingInput,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaceholderError {
    #[error("Unknown placeholder {0}")]
    UnknownPlaceholder(PlaceholderId),

    #[error("Placeholder expects a {expected:?} result, got {found:?}")]
    KindMismatch {
        expected: PlaceholderKind,
        found: PlaceholderKind,
    },
}

/// Outcome of resolving or cancelling a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Final node now sits at `pos`
    Replaced { pos: usize },
    /// Placeholder node was already gone; nothing changed
    Discarded,
    /// Placeholder node was removed
    Cancelled,
}

/// Completed lookup delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceholderResult {
    Gallery(Vec<MediaRecord>),
    UrlEmbed(UrlMetadata),
    Geolocation(GeoPoint),
}

impl PlaceholderResult {
    pub fn kind(&self) -> PlaceholderKind {
        match self {
            PlaceholderResult::Gallery(_) => PlaceholderKind::Gallery,
            PlaceholderResult::UrlEmbed(_) => PlaceholderKind::UrlEmbed,
            PlaceholderResult::Geolocation(_) => PlaceholderKind::Geolocation,
        }
    }

    /// Final node for this result; `None` when nothing usable was selected
    pub fn into_node(self, schema: &Schema) -> Result<Option<Element>, SchemaError> {
        match self {
            PlaceholderResult::Gallery(records) => {
                let images: Vec<GalleryImage> = records
                    .iter()
                    .filter(|record| record.is_image())
                    .map(MediaRecord::to_gallery_image)
                    .collect();
                if images.is_empty() {
                    return Ok(None);
                }
                schema.leaf(GALLERY, &GalleryImage::to_attrs(&images)).map(Some)
            }
            PlaceholderResult::UrlEmbed(metadata) => {
                schema.leaf(URL_EMBED, &metadata.to_attrs()).map(Some)
            }
            PlaceholderResult::Geolocation(point) => {
                schema.leaf(GEOLOCATION, &point.to_attrs()).map(Some)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Tracked {
    kind: PlaceholderKind,
    pos: usize,
    state: PlaceholderState,
}

/// Positions of the placeholders still present in the document
#[derive(Debug, Default)]
pub struct PlaceholderTracker {
    last_id: u64,
    entries: BTreeMap<PlaceholderId, Tracked>,
}

impl PlaceholderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> PlaceholderId {
        self.last_id += 1;
        PlaceholderId(self.last_id)
    }

    fn track(&mut self, id: PlaceholderId, kind: PlaceholderKind, pos: usize) {
        self.entries.insert(
            id,
            Tracked {
                kind,
                pos,
                state: PlaceholderState::Inserted,
            },
        );
    }

    fn forget(&mut self, id: PlaceholderId) {
        self.entries.remove(&id);
    }

    /// Whether this tracker ever handed out `id`
    pub fn issued(&self, id: PlaceholderId) -> bool {
        id.0 >= 1 && id.0 <= self.last_id
    }

    pub fn position(&self, id: PlaceholderId) -> Option<usize> {
        self.entries.get(&id).map(|entry| entry.pos)
    }

    pub fn state(&self, id: PlaceholderId) -> Option<PlaceholderState> {
        self.entries.get(&id).map(|entry| entry.state)
    }

    pub fn ids(&self) -> impl Iterator<Item = PlaceholderId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Carry every position through a committed change
    pub fn map_through(&mut self, mapping: &Mapping) {
        self.entries.retain(|id, entry| {
            let mapped = mapping.map_result(entry.pos, Assoc::After);
            if mapped.deleted {
                debug!(id = %id, pos = entry.pos, "Placeholder deleted");
                return false;
            }
            entry.pos = mapped.pos;
            true
        });
    }

    /// Rebuild positions from the placeholder nodes present in `doc`
    pub fn resync(&mut self, doc: &Document) {
        let mut found = BTreeMap::new();
        doc.descendants(|node, pos| {
            let Node::Element(el) = node else {
                return false;
            };
            if let Some(kind) = PlaceholderKind::from_node_type(&el.type_name) {
                if let Some(raw) = el.attr(PLACEHOLDER_ID).as_i64().filter(|raw| *raw > 0) {
                    let id = PlaceholderId(raw as u64);
                    let state = self
                        .entries
                        .get(&id)
                        .map_or(PlaceholderState::Inserted, |entry| entry.state);
                    found.insert(id, Tracked { kind, pos, state });
                }
                return false;
            }
            true
        });

        if let Some(max) = found.keys().map(|id: &PlaceholderId| id.0).max() {
            self.last_id = self.last_id.max(max);
        }
        self.entries = found;
    }
}

impl EditorSession {
    /// Insert a placeholder block at the cursor.
    ///
    /// Returns `None` without changing anything when the selection sits
    /// inside an atomic node or no block can go there.
    pub fn insert_placeholder(&mut self, kind: PlaceholderKind) -> Option<PlaceholderId> {
        let pos = block_insert_position(self)?;
        let id = self.placeholders.issue();
        let node = self
            .schema
            .container(
                kind.node_type(),
                &attrs! { PLACEHOLDER_ID => id.attr_value() },
                Vec::new(),
            )
            .ok()?;
        let size = node.node_size();

        let mut tr = self.transaction();
        tr.insert(pos, vec![node.into()]).ok()?;
        tr.set_selection(Selection::node(pos, size))
            .set_origin(Origin::Command);
        let follow_ups = self.commit(tr).ok()?;

        let mapped = follow_ups.map_result(pos, Assoc::After);
        if mapped.deleted {
            debug!(id = %id, "Placeholder removed by a post-effect");
            return Some(id);
        }
        self.placeholders.track(id, kind, mapped.pos);
        info!(id = %id, ?kind, pos = mapped.pos, "Inserted placeholder");
        Some(id)
    }

    /// Mark the lookup as started; returns the text typed into the placeholder
    pub fn begin_input(&mut self, id: PlaceholderId) -> Result<String, EditorError> {
        let pos = self.locate(id)?.ok_or(PlaceholderError::UnknownPlaceholder(id))?;
        let text = self
            .doc
            .element_at(pos)
            .map(Element::text_content)
            .unwrap_or_default();

        if let Some(entry) = self.placeholders.entries.get_mut(&id) {
            entry.state = PlaceholderState::AwaitingInput;
        }
        debug!(id = %id, input = %text, "Placeholder awaiting input");
        Ok(text)
    }

    /// Replace the pending input shown inside the placeholder
    pub fn set_pending_input(&mut self, id: PlaceholderId, text: &str) -> Result<(), EditorError> {
        let pos = self.locate(id)?.ok_or(PlaceholderError::UnknownPlaceholder(id))?;
        let content_size = self
            .doc
            .element_at(pos)
            .map_or(0, Element::content_size);

        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(text, Vec::new())]
        };

        let mut tr = self.transaction();
        tr.replace(pos + 1, pos + 1 + content_size, content)?;
        tr.set_origin(Origin::Placeholder);
        self.dispatch(tr)
    }

    /// Replace a placeholder with the node built from a completed lookup.
    ///
    /// A placeholder that was deleted in the meantime (or already resolved or
    /// cancelled) yields [`Resolution::Discarded`] and leaves the document
    /// untouched. A gallery result without any image cancels the placeholder.
    pub fn supply_result(
        &mut self,
        id: PlaceholderId,
        result: PlaceholderResult,
    ) -> Result<Resolution, EditorError> {
        if !self.placeholders.issued(id) {
            return Err(PlaceholderError::UnknownPlaceholder(id).into());
        }
        let Some(expected) = self.placeholders.entries.get(&id).map(|entry| entry.kind) else {
            debug!(id = %id, "Result for a placeholder that is gone");
            return Ok(Resolution::Discarded);
        };
        if result.kind() != expected {
            return Err(PlaceholderError::KindMismatch {
                expected,
                found: result.kind(),
            }
            .into());
        }

        let Some(pos) = self.locate(id)? else {
            self.placeholders.forget(id);
            debug!(id = %id, "Placeholder node no longer matches, dropping result");
            return Ok(Resolution::Discarded);
        };

        let Some(node) = result.into_node(&self.schema)? else {
            self.remove_placeholder(id, pos)?;
            return Ok(Resolution::Cancelled);
        };

        let old_size = self.doc.element_at(pos).map_or(1, Element::node_size);
        let new_size = node.node_size();
        let mut tr = self.transaction();
        tr.replace(pos, pos + old_size, vec![node.into()])?;
        tr.set_selection(Selection::node(pos, new_size))
            .set_origin(Origin::Placeholder);
        let follow_ups = self.commit(tr)?;

        self.placeholders.forget(id);
        let pos = follow_ups.map(pos, Assoc::After);
        info!(id = %id, pos, "Resolved placeholder");
        Ok(Resolution::Replaced { pos })
    }

    /// Remove a placeholder; calling again returns [`Resolution::Discarded`]
    pub fn cancel_placeholder(&mut self, id: PlaceholderId) -> Result<Resolution, EditorError> {
        if !self.placeholders.issued(id) {
            return Err(PlaceholderError::UnknownPlaceholder(id).into());
        }
        match self.locate(id)? {
            Some(pos) => {
                self.remove_placeholder(id, pos)?;
                Ok(Resolution::Cancelled)
            }
            None => {
                self.placeholders.forget(id);
                Ok(Resolution::Discarded)
            }
        }
    }

    /// Drop every placeholder node from the document, outside history
    pub fn abandon_placeholders(&mut self) -> Result<usize, EditorError> {
        let mut found: Vec<(usize, usize)> = Vec::new();
        self.doc.descendants(|node, pos| match node {
            Node::Element(el) if self.schema.is_placeholder(&el.type_name) => {
                found.push((pos, el.node_size()));
                false
            }
            _ => true,
        });

        self.placeholders.entries.clear();
        if found.is_empty() {
            return Ok(0);
        }

        let mut tr = self.transaction();
        for &(pos, size) in found.iter().rev() {
            tr.delete(pos, pos + size)?;
        }
        tr.set_origin(Origin::Placeholder).set_add_to_history(false);
        self.dispatch(tr)?;

        info!(count = found.len(), "Abandoned placeholders");
        Ok(found.len())
    }

    pub fn placeholders(&self) -> &PlaceholderTracker {
        &self.placeholders
    }

    /// Current position of a tracked placeholder whose node is still intact
    fn locate(&self, id: PlaceholderId) -> Result<Option<usize>, EditorError> {
        if !self.placeholders.issued(id) {
            return Err(PlaceholderError::UnknownPlaceholder(id).into());
        }
        let Some(entry) = self.placeholders.entries.get(&id) else {
            return Ok(None);
        };
        let intact = self.doc.element_at(entry.pos).is_some_and(|el| {
            el.type_name == entry.kind.node_type()
                && el.attr(PLACEHOLDER_ID).as_i64() == Some(id.attr_value())
        });
        Ok(intact.then_some(entry.pos))
    }

    fn remove_placeholder(&mut self, id: PlaceholderId, pos: usize) -> Result<(), EditorError> {
        let size = self.doc.element_at(pos).map_or(1, Element::node_size);
        let mut tr = self.transaction();
        tr.delete(pos, pos + size)?;
        tr.set_origin(Origin::Placeholder);
        self.dispatch(tr)?;
        self.placeholders.forget(id);
        info!(id = %id, pos, "Cancelled placeholder");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_model::StepMap;

    #[test]
    fn test_tracker_maps_and_drops() {
        let mut tracker = PlaceholderTracker::new();
        let a = tracker.issue();
        let b = tracker.issue();
        tracker.track(a, PlaceholderKind::Gallery, 4);
        tracker.track(b, PlaceholderKind::UrlEmbed, 10);

        // Insert two positions before both, then delete the first placeholder
        let mut mapping = Mapping::new();
        mapping.push(StepMap::replace(0, 0, 2));
        mapping.push(StepMap::replace(6, 2, 0));
        tracker.map_through(&mapping);

        assert_eq!(tracker.position(a), None);
        assert_eq!(tracker.position(b), Some(10));
        assert!(tracker.issued(a));
        assert!(!tracker.issued(PlaceholderId(3)));
    }

    #[test]
    fn test_empty_gallery_has_no_node() {
        let schema = Schema::standard().unwrap();
        let record = MediaRecord {
            id: "1".into(),
            url: "a.mp4".into(),
            alt: None,
            title: None,
            mime_type: Some("video/mp4".into()),
        };
        let result = PlaceholderResult::Gallery(vec![record]);
        assert_eq!(result.kind(), PlaceholderKind::Gallery);
        assert_eq!(result.into_node(&schema).unwrap(), None);
    }

    #[test]
    fn test_resync_picks_up_restored_nodes() {
        let schema = Schema::standard().unwrap();
        let node = schema
            .container(
                PlaceholderKind::Geolocation.node_type(),
                &attrs! { PLACEHOLDER_ID => 7i64 },
                vec![],
            )
            .unwrap();
        let doc = Document::new(vec![node.into()]);

        let mut tracker = PlaceholderTracker::new();
        tracker.resync(&doc);
        assert_eq!(tracker.position(PlaceholderId(7)), Some(0));
        assert!(tracker.issued(PlaceholderId(7)));
        assert_eq!(tracker.issue(), PlaceholderId(8));
    }
}
