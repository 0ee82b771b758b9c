//! Editor selection

use crate::mapping::{Assoc, Mapping};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    /// Text range; `anchor == head` is a cursor
    Text { anchor: usize, head: usize },
    /// A single node selected as a unit, spanning `from..to`
    Node { from: usize, to: usize },
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Selection::Text {
            anchor: pos,
            head: pos,
        }
    }

    pub fn text(anchor: usize, head: usize) -> Self {
        Selection::Text { anchor, head }
    }

    pub fn node(from: usize, size: usize) -> Self {
        Selection::Node {
            from,
            to: from + size,
        }
    }

    pub fn from(&self) -> usize {
        match *self {
            Selection::Text { anchor, head } => anchor.min(head),
            Selection::Node { from, .. } => from,
        }
    }

    pub fn to(&self) -> usize {
        match *self {
            Selection::Text { anchor, head } => anchor.max(head),
            Selection::Node { to, .. } => to,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from() == self.to()
    }

    /// Carry the selection through a mapping, clamped to `doc_size`.
    ///
    /// A node selection whose node disappeared collapses to a cursor.
    pub fn map(&self, mapping: &Mapping, doc_size: usize) -> Selection {
        match *self {
            Selection::Text { anchor, head } => Selection::Text {
                anchor: mapping.map(anchor, Assoc::After).min(doc_size),
                head: mapping.map(head, Assoc::After).min(doc_size),
            },
            Selection::Node { from, to } => {
                let start = mapping.map_result(from, Assoc::After);
                let end = mapping.map(to, Assoc::Before).min(doc_size);
                if start.deleted || start.pos >= end {
                    Selection::cursor(start.pos.min(doc_size))
                } else {
                    Selection::Node {
                        from: start.pos,
                        to: end,
                    }
                }
            }
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::cursor(0)
    }
}
