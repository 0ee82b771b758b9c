//! # Document Tree
//!
//! The root of an editing session. Positions are integers addressing the
//! gaps between tokens of the tree: entering or leaving a container costs one
//! position, every char costs one, every leaf costs one. Position 0 is the
//! start of the root's content.

use crate::error::StepError;
use crate::node::{normalize, Element, Mark, Node, TextNode};
use crate::Attrs;
use serde::{Deserialize, Serialize};

pub const ROOT_TYPE: &str = "doc";

/// Position-addressed tree of nodes and marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    root: Element,
}

/// Text run reported by [`Document::text_runs`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'d> {
    /// Position of the run's first char
    pub pos: usize,
    pub node: &'d TextNode,
}

impl TextRun<'_> {
    pub fn end(&self) -> usize {
        self.pos + self.node.char_len()
    }
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Self {
            root: Element::container(ROOT_TYPE, Attrs::new(), content),
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn content(&self) -> &[Node] {
        self.root.children()
    }

    /// Size of the root's content (largest valid position)
    pub fn size(&self) -> usize {
        self.root.content_size()
    }

    pub fn text_content(&self) -> String {
        self.root.text_content()
    }

    /// Resolve a position into its ancestry
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>, StepError> {
        let size = self.size();
        if pos > size {
            return Err(StepError::OutOfRange { pos, size });
        }

        let mut path = Vec::new();
        let mut node = &self.root;
        let mut start = 0;

        loop {
            let offset = pos - start;
            let mut child_start = 0;
            let mut found = None;

            for (index, child) in node.children().iter().enumerate() {
                let end = child_start + child.size();
                if offset < end {
                    found = Some((index, child_start, child));
                    break;
                }
                child_start = end;
            }

            match found {
                Some((index, rel, Node::Element(el))) if rel != offset && !el.is_leaf() => {
                    path.push(Frame { node, start, index });
                    node = el;
                    start = start + rel + 1;
                }
                Some((index, rel, child)) => {
                    let text_offset = if child.is_text() { offset - rel } else { 0 };
                    path.push(Frame { node, start, index });
                    return Ok(ResolvedPos {
                        pos,
                        path,
                        parent_offset: offset,
                        text_offset,
                    });
                }
                None => {
                    path.push(Frame {
                        node,
                        start,
                        index: node.child_count(),
                    });
                    return Ok(ResolvedPos {
                        pos,
                        path,
                        parent_offset: offset,
                        text_offset: 0,
                    });
                }
            }
        }
    }

    /// Node starting at `pos`, if any
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let resolved = self.resolve(pos).ok()?;
        if resolved.text_offset() > 0 {
            return None;
        }
        resolved.node_after()
    }

    /// Element starting at `pos`, if any
    pub fn element_at(&self, pos: usize) -> Option<&Element> {
        self.node_at(pos).and_then(Node::as_element)
    }

    /// Visit every descendant with its start position.
    ///
    /// Returning `false` from the callback skips the node's children.
    pub fn descendants<'d, F>(&'d self, mut f: F)
    where
        F: FnMut(&'d Node, usize) -> bool,
    {
        walk(self.root.children(), 0, &mut f);
    }

    /// Every text run in document order
    pub fn text_runs(&self) -> Vec<TextRun<'_>> {
        let mut runs = Vec::new();
        self.descendants(|node, pos| {
            if let Node::Text(text) = node {
                runs.push(TextRun { pos, node: text });
            }
            true
        });
        runs
    }

    pub(crate) fn element_at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut node = &mut self.root;
        for &index in path {
            node = node.content.as_mut()?.get_mut(index)?.as_element_mut()?;
        }
        Some(node)
    }

    pub(crate) fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub(crate) fn renormalize(&mut self) {
        fn visit(el: &mut Element) {
            if let Some(children) = el.content.as_mut() {
                normalize(children);
                for child in children.iter_mut() {
                    if let Node::Element(inner) = child {
                        visit(inner);
                    }
                }
            }
        }
        visit(&mut self.root);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn walk<'d, F>(nodes: &'d [Node], start: usize, f: &mut F)
where
    F: FnMut(&'d Node, usize) -> bool,
{
    let mut pos = start;
    for node in nodes {
        if f(node, pos) {
            if let Node::Element(el) = node {
                walk(el.children(), pos + 1, f);
            }
        }
        pos += node.size();
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame<'d> {
    node: &'d Element,
    /// Absolute position of the start of `node`'s content
    start: usize,
    /// Child index along the path (or at the position, for the innermost frame)
    index: usize,
}

/// A position together with its ancestry
#[derive(Debug, Clone)]
pub struct ResolvedPos<'d> {
    pos: usize,
    path: Vec<Frame<'d>>,
    parent_offset: usize,
    text_offset: usize,
}

impl<'d> ResolvedPos<'d> {
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Depth of the innermost parent (0 = root)
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    pub fn parent(&self) -> &'d Element {
        self.path[self.depth()].node
    }

    pub fn node(&self, depth: usize) -> &'d Element {
        self.path[depth].node
    }

    /// Child index within the node at `depth`
    pub fn index(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Child index within the innermost parent
    pub fn parent_index(&self) -> usize {
        self.path[self.depth()].index
    }

    /// Absolute start of the content of the node at `depth`
    pub fn start(&self, depth: usize) -> usize {
        self.path[depth].start
    }

    /// Absolute end of the content of the node at `depth`
    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Position directly before the node at `depth` (depth >= 1)
    pub fn before(&self, depth: usize) -> usize {
        self.start(depth).saturating_sub(1)
    }

    /// Position directly after the node at `depth` (depth >= 1)
    pub fn after(&self, depth: usize) -> usize {
        self.end(depth) + 1
    }

    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// Offset into the text node the position falls in, 0 at boundaries
    pub fn text_offset(&self) -> usize {
        self.text_offset
    }

    /// Child indices leading from the root to the innermost parent
    pub fn child_path(&self) -> Vec<usize> {
        self.path[..self.depth()].iter().map(|frame| frame.index).collect()
    }

    pub fn node_after(&self) -> Option<&'d Node> {
        let child = self.parent().child(self.parent_index())?;
        if self.text_offset > 0 {
            None
        } else {
            Some(child)
        }
    }

    pub fn node_before(&self) -> Option<&'d Node> {
        if self.text_offset > 0 {
            return None;
        }
        let index = self.parent_index();
        if index == 0 {
            None
        } else {
            self.parent().child(index - 1)
        }
    }

    /// Text node the position falls strictly inside of
    pub fn text_node(&self) -> Option<&'d TextNode> {
        if self.text_offset == 0 {
            return None;
        }
        self.parent().child(self.parent_index()).and_then(Node::as_text)
    }

    /// Marks active at the position.
    ///
    /// Inside a text node its marks apply. At a boundary the marks of the
    /// node before win; marks rejected by `inclusive` only carry over when the
    /// node after also has them.
    pub fn marks<F>(&self, inclusive: F) -> Vec<Mark>
    where
        F: Fn(&Mark) -> bool,
    {
        if self.parent().content_size() == 0 {
            return Vec::new();
        }
        if let Some(text) = self.text_node() {
            return text.marks.clone();
        }

        let (main, other) = match self.node_before() {
            Some(before) => (Some(before), self.node_after()),
            None => (self.node_after(), None),
        };

        let Some(main) = main else {
            return Vec::new();
        };
        let other_marks = other.map(Node::marks).unwrap_or(&[]);

        main.marks()
            .iter()
            .filter(|mark| inclusive(mark) || other_marks.contains(mark))
            .cloned()
            .collect()
    }

    /// Whether the same parent holds both positions
    pub fn same_parent(&self, other: &ResolvedPos<'_>) -> bool {
        self.depth() == other.depth() && self.child_path() == other.child_path()
    }
}
