//! View-layer hooks.
//!
//! A view factory is invoked with a node's current attributes and an
//! [`AttributeUpdater`]. The updater is a plain value addressed by position;
//! the view hands the resulting [`AttributeUpdate`] back to the session that
//! owns the document instead of reaching for a global editor.

use postcraft_model::{Attrs, Element};
use std::fmt;
use std::sync::Arc;

/// Handle a node view uses to request attribute changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUpdater {
    pub pos: usize,
    pub type_name: String,
}

impl AttributeUpdater {
    pub fn new(pos: usize, type_name: impl Into<String>) -> Self {
        Self {
            pos,
            type_name: type_name.into(),
        }
    }

    /// Build a request merging `patch` into the node's attributes
    pub fn request(&self, patch: Attrs) -> AttributeUpdate {
        AttributeUpdate {
            pos: self.pos,
            type_name: self.type_name.clone(),
            patch,
        }
    }
}

/// Pending attribute change for the node at `pos`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeUpdate {
    pub pos: usize,
    /// Expected type of the node; a mismatch drops the update
    pub type_name: String,
    pub patch: Attrs,
}

/// What the view layer needs to render one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeViewDescriptor {
    pub type_name: String,
    /// Normalized current attributes
    pub attrs: Attrs,
    pub editable: bool,
    pub draggable: bool,
    pub updater: AttributeUpdater,
}

type FactoryFn = dyn Fn(&Element, AttributeUpdater) -> NodeViewDescriptor + Send + Sync;

/// Per-type view construction hook
#[derive(Clone)]
pub struct ViewFactory(Arc<FactoryFn>);

impl ViewFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Element, AttributeUpdater) -> NodeViewDescriptor + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn create(&self, node: &Element, updater: AttributeUpdater) -> NodeViewDescriptor {
        (self.0)(node, updater)
    }
}

impl fmt::Debug for ViewFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewFactory")
    }
}

/// Factory for atomic nodes: non-editable body, optional dragging
pub fn atom_view(draggable: bool) -> ViewFactory {
    ViewFactory::new(move |node, updater| NodeViewDescriptor {
        type_name: node.type_name.clone(),
        attrs: node.attrs.clone(),
        editable: false,
        draggable,
        updater,
    })
}

/// Factory for placeholders: the inline input stays editable
pub fn placeholder_view() -> ViewFactory {
    ViewFactory::new(|node, updater| NodeViewDescriptor {
        type_name: node.type_name.clone(),
        attrs: node.attrs.clone(),
        editable: true,
        draggable: false,
        updater,
    })
}
