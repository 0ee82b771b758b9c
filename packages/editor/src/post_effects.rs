//! # Post-Effect System
//!
//! Committed transactions trigger corrective follow-ups that keep document-wide
//! rules intact when the content model alone cannot express them.
//!
//! ## Design
//!
//! After every committed change that altered content, each registered effect
//! inspects the new document and may return one follow-up transaction. The
//! session applies follow-ups immediately, folds them into the history entry
//! of the triggering change, and tags them [`Origin::Invariant`].
//!
//! Post-effects are:
//! - **Deterministic**: Same document always produces the same follow-up
//! - **Idempotent**: Running on their own output produces nothing
//! - **Batched**: All corrections of one effect land in a single transaction

use postcraft_model::{AttrValue, Document, Mark, Origin, StepError, Transaction};
use postcraft_schema::extensions::{LINK, TEXT_STYLE};
use postcraft_schema::Schema;
use tracing::debug;

/// Follow-up producer run after each committed change
pub trait PostEffect: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Corrective follow-up for `doc`, the document after `trigger`
    fn append_transaction(
        &self,
        trigger: &Transaction,
        doc: &Document,
        schema: &Schema,
    ) -> Result<Option<Transaction>, StepError>;
}

/// Text under a link never carries its own color
#[derive(Debug)]
pub struct LinkColorEffect;

impl PostEffect for LinkColorEffect {
    fn name(&self) -> &'static str {
        "link-color"
    }

    fn append_transaction(
        &self,
        trigger: &Transaction,
        doc: &Document,
        schema: &Schema,
    ) -> Result<Option<Transaction>, StepError> {
        if !trigger.doc_changed() {
            return Ok(None);
        }
        enforce_link_color(doc, schema)
    }
}

/// Text run breaking the link/color rule
#[derive(Debug, Clone, PartialEq)]
pub struct LinkColorViolation {
    pub from: usize,
    pub to: usize,
    pub style: Mark,
}

/// Every text run carrying a link and a colored text style
pub fn link_color_violations(doc: &Document) -> Vec<LinkColorViolation> {
    doc.text_runs()
        .into_iter()
        .filter(|run| run.node.has_mark(LINK))
        .filter_map(|run| {
            let style = run.node.mark(TEXT_STYLE)?;
            if style.attr("color").is_null() {
                return None;
            }
            Some(LinkColorViolation {
                from: run.pos,
                to: run.end(),
                style: style.clone(),
            })
        })
        .collect()
}

/// Clear the color of text styles under links.
///
/// The style mark is removed; when any other style attribute differs from its
/// default it is re-added with the color cleared. Returns `None` when nothing
/// needs correcting.
pub fn enforce_link_color(doc: &Document, schema: &Schema) -> Result<Option<Transaction>, StepError> {
    let violations = link_color_violations(doc);
    if violations.is_empty() {
        return Ok(None);
    }

    let style_spec = schema.mark_spec(TEXT_STYLE);
    let mut tr = Transaction::new(doc);
    tr.set_origin(Origin::Invariant);

    for violation in &violations {
        tr.remove_mark(violation.from, violation.to, TEXT_STYLE)?;

        let mut attrs = violation.style.attrs.clone();
        attrs.insert("color".to_string(), AttrValue::Null);

        let keeps_style = attrs.iter().any(|(name, value)| {
            let default = style_spec
                .and_then(|spec| spec.attr_spec(name))
                .map(|attr| &attr.default);
            match default {
                Some(default) => value != default,
                None => !value.is_null(),
            }
        });
        if keeps_style {
            tr.add_mark(violation.from, violation.to, Mark::with_attrs(TEXT_STYLE, attrs))?;
        }
    }

    debug!(runs = violations.len(), "Cleared link text color");
    Ok(Some(tr))
}

/// Post-effect engine that runs all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(LinkColorEffect)],
        }
    }

    /// Create an engine without effects
    pub fn empty() -> Self {
        Self { effects: Vec::new() }
    }

    /// Add a custom effect to the engine
    pub fn add_effect(&mut self, effect: Box<dyn PostEffect>) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[Box<dyn PostEffect>] {
        &self.effects
    }

    /// Follow-ups for a committed transaction, each built on the previous one
    pub fn run(
        &self,
        trigger: &Transaction,
        doc: &Document,
        schema: &Schema,
    ) -> Result<Vec<Transaction>, StepError> {
        let mut follow_ups: Vec<Transaction> = Vec::new();

        for effect in &self.effects {
            let current = follow_ups.last().map_or(doc, |tr| tr.doc());
            if let Some(tr) = effect.append_transaction(trigger, current, schema)? {
                if tr.doc_changed() {
                    debug!(effect = effect.name(), steps = tr.steps().len(), "Post-effect follow-up");
                    follow_ups.push(tr);
                }
            }
        }

        Ok(follow_ups)
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}
