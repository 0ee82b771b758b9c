//! # Input Rules
//!
//! Turn a typed character sequence into a structured node.
//!
//! Rules see the text of the current textblock immediately before the cursor
//! (at most [`MAX_MATCH`] chars) plus the text being typed. A pattern must end
//! at the cursor. Inline leaves show up as U+FFFC so they never take part in a
//! match. Rules stay off inside code blocks and code-marked text.

use postcraft_model::{Mark, Node, Origin, Selection, StepError, Transaction};
use postcraft_model::Document;
use postcraft_schema::extensions::{inline_math, CODE};
use postcraft_schema::Schema;
use regex::{Captures, Regex};
use std::sync::Arc;
use tracing::debug;

/// Longest text window a rule can see
pub const MAX_MATCH: usize = 500;

const LEAF_CHAR: &str = "\u{fffc}";

type Substitute = dyn Fn(&Captures<'_>) -> Node + Send + Sync;

/// Pattern over trailing input plus the node that replaces the match
#[derive(Clone)]
pub struct InputRule {
    pub name: &'static str,
    pattern: Regex,
    substitute: Arc<Substitute>,
}

impl InputRule {
    pub fn new<F>(name: &'static str, pattern: Regex, substitute: F) -> Self
    where
        F: Fn(&Captures<'_>) -> Node + Send + Sync + 'static,
    {
        Self {
            name,
            pattern,
            substitute: Arc::new(substitute),
        }
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl std::fmt::Debug for InputRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// `$$formula$$` → inline math
pub fn inline_math_rule() -> InputRule {
    let pattern = Regex::new(r"\$\$([^$\x{FFFC}]+)\$\$$").unwrap();
    InputRule::new("inline-math", pattern, |caps| {
        let formula = caps.get(1).map_or("", |m| m.as_str());
        inline_math(formula).into()
    })
}

/// Ordered rule set; the first matching rule wins
#[derive(Debug, Clone)]
pub struct InputRules {
    rules: Vec<InputRule>,
}

impl InputRules {
    /// Rule set with the built-in rules
    pub fn new() -> Self {
        Self {
            rules: vec![inline_math_rule()],
        }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add(&mut self, rule: InputRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[InputRule] {
        &self.rules
    }

    /// Transaction replacing the matched span when `text`, typed over
    /// `from..to`, completes a pattern
    pub fn try_match(
        &self,
        doc: &Document,
        schema: &Schema,
        from: usize,
        to: usize,
        text: &str,
    ) -> Result<Option<Transaction>, StepError> {
        if self.rules.is_empty() {
            return Ok(None);
        }

        let start = doc.resolve(from)?;
        let end = doc.resolve(to)?;
        if !start.same_parent(&end) {
            return Ok(None);
        }

        let parent = start.parent();
        let Some(spec) = schema.node_spec(&parent.type_name) else {
            return Ok(None);
        };
        if !spec.is_textblock() || spec.code || spec.atom {
            return Ok(None);
        }
        if (1..start.depth()).any(|d| schema.is_atom(&start.node(d).type_name)) {
            return Ok(None);
        }
        let marks = start.marks(|m| schema.is_inclusive(m));
        if marks.iter().any(|m| m.is_type(CODE)) {
            return Ok(None);
        }

        let offset = start.parent_offset();
        let before = parent.text_between(offset.saturating_sub(MAX_MATCH), offset, LEAF_CHAR);
        let before_chars = before.chars().count();
        let window = format!("{}{}", before, text);

        for rule in &self.rules {
            let Some(caps) = rule.pattern.captures(&window) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.end() != window.len() {
                continue;
            }

            let match_chars = window[..whole.start()].chars().count();
            let node = (rule.substitute)(&caps);

            let mut content = Vec::new();
            let replace_from = if match_chars >= before_chars {
                // Match starts inside the typed text; keep what precedes it
                let typed_prefix: String = text.chars().take(match_chars - before_chars).collect();
                if !typed_prefix.is_empty() {
                    content.push(Node::text(typed_prefix, marks.clone()));
                }
                from
            } else {
                from - (before_chars - match_chars)
            };
            content.push(node);

            let inserted = postcraft_model::content_size(&content);
            let mut tr = Transaction::new(doc);
            tr.replace(replace_from, to, content)?;
            tr.set_selection(Selection::cursor(replace_from + inserted))
                .set_origin(Origin::InputRule);

            debug!(rule = rule.name, from = replace_from, to, "Input rule fired");
            return Ok(Some(tr));
        }

        Ok(None)
    }
}

impl Default for InputRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks typed text should carry at `pos`
pub(crate) fn typing_marks(doc: &Document, schema: &Schema, pos: usize) -> Vec<Mark> {
    doc.resolve(pos)
        .map(|rp| rp.marks(|m| schema.is_inclusive(m)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_model::{attrs, Element};
    use postcraft_schema::extensions::{CODE_BLOCK, INLINE_MATH, PARAGRAPH};

    fn schema() -> Schema {
        Schema::standard().unwrap()
    }

    fn block(type_name: &str, nodes: Vec<Node>) -> Document {
        Document::new(vec![Element::container(type_name, attrs! {}, nodes).into()])
    }

    #[test]
    fn test_math_pattern_anchors_at_end() {
        let rule = inline_math_rule();
        assert!(rule.pattern().is_match("area $$r^2$$"));
        assert!(!rule.pattern().is_match("$$r^2$$ more"));
        assert!(!rule.pattern().is_match("$$a\u{fffc}b$$"));
    }

    #[test]
    fn test_math_pattern_fires_on_closing_dollar() {
        let doc = block(PARAGRAPH, vec![Node::text("a $$x^2$", vec![])]);
        // Cursor at end of text: 1 + 8
        let tr = InputRules::new()
            .try_match(&doc, &schema(), 9, 9, "$")
            .unwrap()
            .unwrap();

        let para = tr.doc().content()[0].as_element().unwrap();
        assert_eq!(para.child_count(), 2);
        assert_eq!(para.children()[0], Node::text("a ", vec![]));
        let math = para.children()[1].as_element().unwrap();
        assert_eq!(math.type_name, INLINE_MATH);
        assert_eq!(math.attr("formula").as_str(), Some("x^2"));
        assert_eq!(tr.selection(), Some(Selection::cursor(4)));
        assert_eq!(tr.origin(), Origin::InputRule);
    }

    #[test]
    fn test_whole_pattern_typed_at_once() {
        let doc = block(PARAGRAPH, vec![Node::text("ab", vec![])]);
        let tr = InputRules::new()
            .try_match(&doc, &schema(), 3, 3, " $$y$$")
            .unwrap()
            .unwrap();
        assert_eq!(tr.doc().text_content(), "ab ");
        assert_eq!(tr.selection(), Some(Selection::cursor(5)));
    }

    #[test]
    fn test_no_match_without_closing() {
        let doc = block(PARAGRAPH, vec![Node::text("$$x^2", vec![])]);
        assert!(InputRules::new()
            .try_match(&doc, &schema(), 6, 6, "$")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_leaf_breaks_window() {
        let doc = block(
            PARAGRAPH,
            vec![
                Node::text("$$a", vec![]),
                inline_math("z").into(),
                Node::text("b$", vec![]),
            ],
        );
        // $$a￼b$ + $ must not match across the leaf
        assert!(InputRules::new()
            .try_match(&doc, &schema(), 7, 7, "$")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_placeholder_content_is_ignored() {
        let doc = block(
            postcraft_schema::extensions::URL_EMBED_PLACEHOLDER,
            vec![Node::text("$$x$", vec![])],
        );
        assert!(InputRules::new()
            .try_match(&doc, &schema(), 5, 5, "$")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_code_block_is_ignored() {
        let doc = block(CODE_BLOCK, vec![Node::text("$$x$", vec![])]);
        assert!(InputRules::new()
            .try_match(&doc, &schema(), 5, 5, "$")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_code_mark_is_ignored() {
        let doc = block(PARAGRAPH, vec![Node::text("$$x$", vec![Mark::new(CODE)])]);
        assert!(InputRules::new()
            .try_match(&doc, &schema(), 3, 3, "$")
            .unwrap()
            .is_none());
    }
}
