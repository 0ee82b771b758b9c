//! # Steps
//!
//! Atomic document changes. A transaction is a sequence of steps; each step
//! produces a new document and a [`StepMap`] describing how positions moved.
//!
//! ## Step Semantics
//!
//! ### Replace
//! - Replaces `from..to` with a node sequence
//! - Both ends must share one parent (flat replace)
//! - Text nodes at the edges are split, adjacent text is re-merged
//!
//! ### AddMark / RemoveMark
//! - Applies to every text node intersecting the range, at any depth
//! - Adding replaces an existing mark of the same type
//! - Positions never move
//!
//! ### SetAttrs
//! - Replaces the attribute bag of the element starting at `pos`

use crate::document::Document;
use crate::error::StepError;
use crate::mapping::StepMap;
use crate::node::{add_to_set, content_size, normalize, remove_from_set, split_content, Mark, Node};
use crate::Attrs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Replace {
        from: usize,
        to: usize,
        content: Vec<Node>,
    },
    AddMark {
        from: usize,
        to: usize,
        mark: Mark,
    },
    RemoveMark {
        from: usize,
        to: usize,
        mark_type: String,
    },
    SetAttrs {
        pos: usize,
        attrs: Attrs,
    },
}

impl Step {
    /// Apply to a document, producing the changed copy
    pub fn apply(&self, doc: &Document) -> Result<Document, StepError> {
        match self {
            Step::Replace { from, to, content } => apply_replace(doc, *from, *to, content),
            Step::AddMark { from, to, mark } => apply_mark(doc, *from, *to, |marks| {
                add_to_set(marks, mark.clone())
            }),
            Step::RemoveMark { from, to, mark_type } => {
                apply_mark(doc, *from, *to, |marks| remove_from_set(marks, mark_type))
            }
            Step::SetAttrs { pos, attrs } => apply_set_attrs(doc, *pos, attrs),
        }
    }

    pub fn step_map(&self) -> StepMap {
        match self {
            Step::Replace { from, to, content } => {
                StepMap::replace(*from, to - from, content_size(content))
            }
            _ => StepMap::identity(),
        }
    }
}

fn check_range(doc: &Document, from: usize, to: usize) -> Result<(), StepError> {
    if from > to {
        return Err(StepError::InvalidRange { from, to });
    }
    let size = doc.size();
    if to > size {
        return Err(StepError::OutOfRange { pos: to, size });
    }
    Ok(())
}

fn apply_replace(doc: &Document, from: usize, to: usize, content: &[Node]) -> Result<Document, StepError> {
    check_range(doc, from, to)?;

    let start = doc.resolve(from)?;
    let end = doc.resolve(to)?;
    if !start.same_parent(&end) {
        return Err(StepError::CrossParent { from, to });
    }

    let path = start.child_path();
    let (from_offset, to_offset) = (start.parent_offset(), end.parent_offset());

    let mut next = doc.clone();
    let parent = next
        .element_at_path_mut(&path)
        .ok_or(StepError::NotAnElement(from))?;
    let children = parent
        .content
        .as_mut()
        .ok_or(StepError::NotAContainer(from))?;

    let (left, rest) = split_content(children, from_offset);
    let (_, right) = split_content(&rest, to_offset - from_offset);

    let mut replaced = left;
    replaced.extend(content.iter().cloned());
    replaced.extend(right);
    normalize(&mut replaced);
    *children = replaced;

    Ok(next)
}

fn apply_mark<F>(doc: &Document, from: usize, to: usize, f: F) -> Result<Document, StepError>
where
    F: Fn(&mut Vec<Mark>),
{
    check_range(doc, from, to)?;

    let mut next = doc.clone();
    if let Some(children) = next.root_mut().content.as_mut() {
        mark_range(children, 0, from, to, &f);
    }
    next.renormalize();
    Ok(next)
}

fn mark_range<F>(nodes: &mut Vec<Node>, start: usize, from: usize, to: usize, f: &F)
where
    F: Fn(&mut Vec<Mark>),
{
    let mut out = Vec::with_capacity(nodes.len());
    let mut pos = start;

    for node in nodes.drain(..) {
        let size = node.size();
        let end = pos + size;

        match node {
            Node::Text(text) if end > from && pos < to => {
                let cut_from = from.saturating_sub(pos);
                let cut_to = (to - pos).min(size);
                let chars: Vec<char> = text.text.chars().collect();

                let piece = |a: usize, b: usize| -> String { chars[a..b].iter().collect() };

                if cut_from > 0 {
                    out.push(Node::text(piece(0, cut_from), text.marks.clone()));
                }
                let mut marks = text.marks.clone();
                f(&mut marks);
                out.push(Node::text(piece(cut_from, cut_to), marks));
                if cut_to < size {
                    out.push(Node::text(piece(cut_to, size), text.marks.clone()));
                }
            }
            Node::Element(mut el) if end > from && pos < to => {
                if let Some(children) = el.content.as_mut() {
                    mark_range(children, pos + 1, from, to, f);
                }
                out.push(Node::Element(el));
            }
            other => out.push(other),
        }

        pos = end;
    }

    *nodes = out;
}

fn apply_set_attrs(doc: &Document, pos: usize, attrs: &Attrs) -> Result<Document, StepError> {
    let resolved = doc.resolve(pos)?;
    match resolved.node_after() {
        Some(Node::Element(_)) => {}
        _ => return Err(StepError::NotAnElement(pos)),
    }

    let mut path = resolved.child_path();
    path.push(resolved.parent_index());

    let mut next = doc.clone();
    let element = next
        .element_at_path_mut(&path)
        .ok_or(StepError::NotAnElement(pos))?;
    element.attrs = attrs.clone();
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;
    use crate::node::Element;
    use crate::AttrValue;

    fn paragraph(nodes: Vec<Node>) -> Node {
        Element::container("paragraph", attrs! {}, nodes).into()
    }

    #[test]
    fn test_replace_inside_text() {
        let doc = Document::new(vec![paragraph(vec![Node::text("hello", vec![])])]);
        let step = Step::Replace {
            from: 2,
            to: 4,
            content: vec![Element::leaf("inline-math", attrs! { "formula" => "x" }).into()],
        };

        let next = step.apply(&doc).unwrap();
        let para = next.content()[0].as_element().unwrap();
        assert_eq!(para.child_count(), 3);
        assert_eq!(para.children()[0], Node::text("h", vec![]));
        assert_eq!(para.children()[2], Node::text("lo", vec![]));
        assert_eq!(step.step_map().map(6, crate::Assoc::After), 5);
    }

    #[test]
    fn test_replace_across_parents_fails() {
        let doc = Document::new(vec![
            paragraph(vec![Node::text("ab", vec![])]),
            paragraph(vec![Node::text("cd", vec![])]),
        ]);
        let step = Step::Replace {
            from: 2,
            to: 6,
            content: vec![],
        };
        assert_eq!(step.apply(&doc), Err(StepError::CrossParent { from: 2, to: 6 }));
    }

    #[test]
    fn test_delete_whole_block() {
        let doc = Document::new(vec![
            paragraph(vec![Node::text("ab", vec![])]),
            Element::leaf("image", attrs! {}).into(),
        ]);
        let step = Step::Replace {
            from: 4,
            to: 5,
            content: vec![],
        };
        let next = step.apply(&doc).unwrap();
        assert_eq!(next.content().len(), 1);
    }

    #[test]
    fn test_add_mark_splits_text() {
        let doc = Document::new(vec![paragraph(vec![Node::text("abcd", vec![])])]);
        let bold = Mark::new("bold");
        let next = Step::AddMark {
            from: 2,
            to: 4,
            mark: bold.clone(),
        }
        .apply(&doc)
        .unwrap();

        let para = next.content()[0].as_element().unwrap();
        assert_eq!(
            para.children(),
            &[
                Node::text("a", vec![]),
                Node::text("bc", vec![bold]),
                Node::text("d", vec![]),
            ]
        );
    }

    #[test]
    fn test_remove_mark_remerges() {
        let bold = Mark::new("bold");
        let doc = Document::new(vec![paragraph(vec![
            Node::text("a", vec![]),
            Node::text("bc", vec![bold]),
        ])]);
        let next = Step::RemoveMark {
            from: 1,
            to: 4,
            mark_type: "bold".to_string(),
        }
        .apply(&doc)
        .unwrap();

        let para = next.content()[0].as_element().unwrap();
        assert_eq!(para.children(), &[Node::text("abc", vec![])]);
    }

    #[test]
    fn test_set_attrs_requires_element() {
        let doc = Document::new(vec![Element::leaf("image", attrs! { "src" => "a" }).into()]);
        let next = Step::SetAttrs {
            pos: 0,
            attrs: attrs! { "src" => "b" },
        }
        .apply(&doc)
        .unwrap();
        assert_eq!(next.element_at(0).unwrap().attr("src"), &AttrValue::from("b"));

        let err = Step::SetAttrs { pos: 1, attrs: attrs! {} }.apply(&doc);
        assert_eq!(err, Err(StepError::NotAnElement(1)));
    }
}
