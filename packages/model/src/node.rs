//! # Content nodes
//!
//! Nodes are value-like: structural edits clone the affected path instead of
//! sharing subtrees. Sizes follow the position scheme used everywhere in the
//! engine:
//!
//! - a text node counts one per char
//! - a leaf element counts 1
//! - a container element counts its content plus 2 (open and close)

use crate::attrs::{AttrValue, Attrs, NULL};
use serde::{Deserialize, Serialize};

/// Range-scoped annotation over text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub type_name: String,
    #[serde(default)]
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(type_name: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
        }
    }

    pub fn attr(&self, name: &str) -> &AttrValue {
        self.attrs.get(name).unwrap_or(&NULL)
    }

    pub fn is_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }
}

/// Add `mark` to a mark set, replacing any mark of the same type.
///
/// Sets are kept sorted by type name so equal sets compare equal.
pub fn add_to_set(marks: &mut Vec<Mark>, mark: Mark) {
    marks.retain(|m| m.type_name != mark.type_name);
    marks.push(mark);
    marks.sort_by(|a, b| a.type_name.cmp(&b.type_name));
}

/// Remove every mark of `type_name` from a mark set.
pub fn remove_from_set(marks: &mut Vec<Mark>, type_name: &str) {
    marks.retain(|m| m.type_name != type_name);
}

/// Run of text sharing one mark set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl TextNode {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn mark(&self, type_name: &str) -> Option<&Mark> {
        self.marks.iter().find(|m| m.type_name == type_name)
    }

    pub fn has_mark(&self, type_name: &str) -> bool {
        self.mark(type_name).is_some()
    }

    /// Slice by char offsets
    fn slice(&self, from: usize, to: usize) -> TextNode {
        TextNode {
            text: self.text.chars().skip(from).take(to - from).collect(),
            marks: self.marks.clone(),
        }
    }
}

/// Non-text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub type_name: String,
    #[serde(default)]
    pub attrs: Attrs,
    /// `None` for leaves (content model `none`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Node>>,
}

impl Element {
    pub fn leaf(type_name: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
            content: None,
        }
    }

    pub fn container(type_name: impl Into<String>, attrs: Attrs, content: Vec<Node>) -> Self {
        let mut content = content;
        normalize(&mut content);
        Self {
            type_name: type_name.into(),
            attrs,
            content: Some(content),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.content.is_none()
    }

    pub fn children(&self) -> &[Node] {
        self.content.as_deref().unwrap_or(&[])
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children().get(index)
    }

    pub fn attr(&self, name: &str) -> &AttrValue {
        self.attrs.get(name).unwrap_or(&NULL)
    }

    pub fn content_size(&self) -> usize {
        content_size(self.children())
    }

    pub fn node_size(&self) -> usize {
        match &self.content {
            None => 1,
            Some(children) => content_size(children) + 2,
        }
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            child.collect_text(&mut out);
        }
        out
    }

    /// Text between two content offsets; leaf elements contribute `leaf_text`.
    pub fn text_between(&self, from: usize, to: usize, leaf_text: &str) -> String {
        let mut out = String::new();
        let mut offset = 0;

        for child in self.children() {
            let size = child.size();
            let end = offset + size;
            if end > from && offset < to {
                match child {
                    Node::Text(text) => {
                        let start = from.saturating_sub(offset);
                        let stop = (to - offset).min(size);
                        out.extend(text.text.chars().skip(start).take(stop - start));
                    }
                    Node::Element(el) if el.is_leaf() => out.push_str(leaf_text),
                    Node::Element(el) => {
                        let inner_from = from.saturating_sub(offset + 1);
                        let inner_to = (to - offset).saturating_sub(1).min(el.content_size());
                        out.push_str(&el.text_between(inner_from, inner_to, leaf_text));
                    }
                }
            }
            offset = end;
            if offset >= to {
                break;
            }
        }

        out
    }
}

/// Positioned unit of document content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text(TextNode),
}

impl Node {
    pub fn text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        let mut marks = marks;
        marks.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        Node::Text(TextNode {
            text: text.into(),
            marks,
        })
    }

    pub fn size(&self) -> usize {
        match self {
            Node::Text(t) => t.char_len(),
            Node::Element(el) => el.node_size(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Node::Text(_) => "text",
            Node::Element(el) => &el.type_name,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    pub fn marks(&self) -> &[Mark] {
        match self {
            Node::Text(t) => &t.marks,
            Node::Element(_) => &[],
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(el) => {
                for child in el.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

pub fn content_size(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::size).sum()
}

/// Split a content sequence at an offset.
///
/// The offset must fall on a child boundary or inside a text node.
pub(crate) fn split_content(nodes: &[Node], offset: usize) -> (Vec<Node>, Vec<Node>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;

    for node in nodes {
        let size = node.size();
        if pos + size <= offset {
            left.push(node.clone());
        } else if pos >= offset {
            right.push(node.clone());
        } else if let Node::Text(text) = node {
            let cut = offset - pos;
            left.push(Node::Text(text.slice(0, cut)));
            right.push(Node::Text(text.slice(cut, size)));
        } else {
            // Offsets inside an element never reach this level
            right.push(node.clone());
        }
        pos += size;
    }

    (left, right)
}

/// Drop empty text nodes and merge adjacent text nodes with equal marks.
pub fn normalize(nodes: &mut Vec<Node>) {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());

    for node in nodes.drain(..) {
        match node {
            Node::Text(text) if text.text.is_empty() => {}
            Node::Text(text) => match merged.last_mut() {
                Some(Node::Text(prev)) if prev.marks == text.marks => prev.text.push_str(&text.text),
                _ => merged.push(Node::Text(text)),
            },
            other => merged.push(other),
        }
    }

    *nodes = merged;
}
