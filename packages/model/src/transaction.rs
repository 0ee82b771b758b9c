//! # Transactions
//!
//! A transaction accumulates steps against a starting document. Each step is
//! validated and applied immediately so later steps address the updated
//! document; the accumulated [`Mapping`] carries outside positions from the
//! starting document to the final one.

use crate::document::Document;
use crate::error::StepError;
use crate::mapping::Mapping;
use crate::node::{Mark, Node};
use crate::selection::Selection;
use crate::step::Step;
use crate::Attrs;

/// Where a change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    User,
    Command,
    InputRule,
    Placeholder,
    /// Follow-up issued by a post-commit invariant pass
    Invariant,
    History,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    before: Document,
    doc: Document,
    steps: Vec<Step>,
    mapping: Mapping,
    selection: Option<Selection>,
    origin: Origin,
    add_to_history: bool,
}

impl Transaction {
    pub fn new(doc: &Document) -> Self {
        Self {
            before: doc.clone(),
            doc: doc.clone(),
            steps: Vec::new(),
            mapping: Mapping::new(),
            selection: None,
            origin: Origin::default(),
            add_to_history: true,
        }
    }

    /// Validate and apply a step
    pub fn step(&mut self, step: Step) -> Result<&mut Self, StepError> {
        let next = step.apply(&self.doc)?;
        self.mapping.push(step.step_map());
        self.steps.push(step);
        self.doc = next;
        Ok(self)
    }

    pub fn replace(&mut self, from: usize, to: usize, content: Vec<Node>) -> Result<&mut Self, StepError> {
        self.step(Step::Replace { from, to, content })
    }

    pub fn insert(&mut self, pos: usize, content: Vec<Node>) -> Result<&mut Self, StepError> {
        self.replace(pos, pos, content)
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, StepError> {
        self.replace(from, to, Vec::new())
    }

    pub fn insert_text(&mut self, pos: usize, text: &str, marks: Vec<Mark>) -> Result<&mut Self, StepError> {
        self.insert(pos, vec![Node::text(text, marks)])
    }

    pub fn add_mark(&mut self, from: usize, to: usize, mark: Mark) -> Result<&mut Self, StepError> {
        self.step(Step::AddMark { from, to, mark })
    }

    pub fn remove_mark(&mut self, from: usize, to: usize, mark_type: &str) -> Result<&mut Self, StepError> {
        self.step(Step::RemoveMark {
            from,
            to,
            mark_type: mark_type.to_string(),
        })
    }

    pub fn set_node_attrs(&mut self, pos: usize, attrs: Attrs) -> Result<&mut Self, StepError> {
        self.step(Step::SetAttrs { pos, attrs })
    }

    /// Explicit selection after the transaction (mapped otherwise)
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    pub fn set_origin(&mut self, origin: Origin) -> &mut Self {
        self.origin = origin;
        self
    }

    pub fn set_add_to_history(&mut self, add: bool) -> &mut Self {
        self.add_to_history = add;
        self
    }

    pub fn before(&self) -> &Document {
        &self.before
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn add_to_history(&self) -> bool {
        self.add_to_history
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn into_doc(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs;
    use crate::node::Element;
    use crate::Assoc;

    #[test]
    fn test_steps_address_updated_document() {
        let doc = Document::new(vec![Element::container(
            "paragraph",
            attrs! {},
            vec![Node::text("ab", vec![])],
        )
        .into()]);

        let mut tr = Transaction::new(&doc);
        tr.insert_text(1, "xy", vec![]).unwrap();
        tr.insert_text(5, "z", vec![]).unwrap();

        assert_eq!(tr.doc().text_content(), "xyabz");
        assert_eq!(tr.before().text_content(), "ab");
        assert_eq!(tr.mapping().map(3, Assoc::After), 6);
        assert!(tr.doc_changed());
    }

    #[test]
    fn test_failed_step_leaves_transaction_untouched() {
        let doc = Document::default();
        let mut tr = Transaction::new(&doc);
        assert!(tr.delete(0, 3).is_err());
        assert!(!tr.doc_changed());
    }
}
