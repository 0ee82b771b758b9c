//! Markup → document.
//!
//! Loading is tolerant: unknown elements are dropped with their subtree,
//! malformed attribute values fall back to their defaults, and stray inline
//! content at block level is wrapped in a paragraph. Only markup that is not
//! well-formed XML fails.

use crate::error::MarkupError;
use postcraft_model::{add_to_set, AttrValue, Attrs, Document, Element, Mark, Node};
use postcraft_schema::extensions::{BOLD, ITALIC, PARAGRAPH};
use postcraft_schema::{
    heading_level, AttributeSpec, ContentExpr, MarkMarkup, MarkSpec, NodeGroup, NodeSpec, Schema,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Why an element did not make it into the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    UnknownType,
    Misplaced { parent: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedElement {
    pub tag: String,
    /// Byte offset of the element in the input
    pub position: usize,
    pub reason: DropReason,
}

/// What a tolerant load had to discard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub dropped: Vec<DroppedElement>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Parse markup into a document
pub fn parse(markup: &str, schema: &Schema) -> Result<Document, MarkupError> {
    parse_with_report(markup, schema).map(|(doc, _)| doc)
}

/// Parse markup, also reporting what was dropped
#[instrument(skip_all, fields(len = markup.len()))]
pub fn parse_with_report(
    markup: &str,
    schema: &Schema,
) -> Result<(Document, ParseReport), MarkupError> {
    let mut reader = Reader::from_str(markup);
    reader.trim_text(false);

    let mut parser = TreeBuilder::new(schema);

    loop {
        let position = reader.buffer_position();
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(MarkupError::Malformed {
                    position: reader.buffer_position(),
                    message: e.to_string(),
                })
            }
        };

        match event {
            Event::Start(e) => parser.open(&e, position, false),
            Event::Empty(e) => parser.open(&e, position, true),
            Event::End(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                parser.close(&tag)?;
            }
            Event::Text(e) => {
                let text = match e.unescape() {
                    Ok(text) => text,
                    Err(err) => {
                        debug!(error = %err, "Unknown entity, keeping raw text");
                        Cow::Owned(String::from_utf8_lossy(&e).into_owned())
                    }
                };
                parser.text(&text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                parser.text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let (doc, report) = parser.finish();
    if !report.is_clean() {
        debug!(dropped = report.dropped.len(), "Markup loaded with drops");
    }
    Ok((doc, report))
}

enum FrameKind {
    Node { type_name: String, attrs: Attrs },
    Mark(Mark),
    /// Element contributing nothing itself (unstyled span, `<code>` in `<pre>`)
    Transparent,
    /// Dropped subtree
    Skip,
}

struct Frame {
    kind: FrameKind,
    tag: String,
    content: ContentExpr,
    children: Vec<Node>,
    /// Inline content met at block level, waiting for a paragraph
    pending_inline: Vec<Node>,
}

struct TreeBuilder<'s> {
    schema: &'s Schema,
    stack: Vec<Frame>,
    report: ParseReport,
}

impl<'s> TreeBuilder<'s> {
    fn new(schema: &'s Schema) -> Self {
        let root = Frame {
            kind: FrameKind::Node {
                type_name: postcraft_model::ROOT_TYPE.to_string(),
                attrs: Attrs::new(),
            },
            tag: String::new(),
            content: schema.root_content(),
            children: Vec::new(),
            pending_inline: Vec::new(),
        };
        Self {
            schema,
            stack: vec![root],
            report: ParseReport::default(),
        }
    }

    fn skipping(&self) -> bool {
        self.stack
            .iter()
            .any(|f| matches!(f.kind, FrameKind::Skip))
    }

    /// Innermost node frame index
    fn node_frame(&self) -> usize {
        self.stack
            .iter()
            .rposition(|f| matches!(f.kind, FrameKind::Node { .. }))
            .unwrap_or(0)
    }

    fn active_marks(&self) -> Vec<Mark> {
        let mut marks = Vec::new();
        let start = self.node_frame();
        for frame in &self.stack[start..] {
            if let FrameKind::Mark(mark) = &frame.kind {
                let nested = nested_mark(&marks, mark);
                add_to_set(&mut marks, nested);
            }
        }
        marks
    }

    fn push(&mut self, kind: FrameKind, tag: &str, content: ContentExpr) {
        self.stack.push(Frame {
            kind,
            tag: tag.to_string(),
            content,
            children: Vec::new(),
            pending_inline: Vec::new(),
        });
    }

    fn drop_element(&mut self, tag: &str, position: usize, reason: DropReason, empty: bool) {
        warn!(tag = %tag, position, reason = ?reason, "Dropping element");
        self.report.dropped.push(DroppedElement {
            tag: tag.to_string(),
            position,
            reason,
        });
        if !empty {
            self.push(FrameKind::Skip, tag, ContentExpr::None);
        }
    }

    fn open(&mut self, e: &BytesStart<'_>, position: usize, empty: bool) {
        let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();

        if self.skipping() {
            if !empty {
                self.push(FrameKind::Skip, &tag, ContentExpr::None);
            }
            return;
        }

        let raw = raw_attributes(e);
        let parent = self.node_frame();
        let parent_content = self.stack[parent].content;

        if parent_content == ContentExpr::Text {
            // Code content keeps its text and nothing else
            if !empty {
                self.push(FrameKind::Transparent, &tag, ContentExpr::Text);
            }
            return;
        }

        if let Some(mark) = self.mark_for(&tag, &raw) {
            if !empty {
                let kind = match mark {
                    Some(mark) => FrameKind::Mark(mark),
                    None => FrameKind::Transparent,
                };
                self.push(kind, &tag, parent_content);
            }
            return;
        }

        let Some(spec) = self.schema.node_for_tag(&tag) else {
            self.drop_element(&tag, position, DropReason::UnknownType, empty);
            return;
        };

        let fits = match spec.group {
            NodeGroup::Inline => parent_content.is_inline() || accepts_wrapped_inline(parent_content),
            NodeGroup::Block => parent_content.allows(spec),
        };
        if !fits {
            let parent_type = match &self.stack[parent].kind {
                FrameKind::Node { type_name, .. } => type_name.clone(),
                _ => String::new(),
            };
            self.drop_element(
                &tag,
                position,
                DropReason::Misplaced { parent: parent_type },
                empty,
            );
            return;
        }

        let attrs = parse_attrs(spec, &tag, &raw);

        if spec.is_leaf() {
            let leaf = Node::from(Element::leaf(spec.name.clone(), attrs));
            self.append(leaf, spec.group);
            if !empty {
                // `<hr></hr>`: ignore whatever the leaf wraps
                self.push(FrameKind::Skip, &tag, ContentExpr::None);
            }
            return;
        }

        self.push(
            FrameKind::Node {
                type_name: spec.name.clone(),
                attrs,
            },
            &tag,
            spec.content,
        );
        if empty {
            self.pop_frame();
        }
    }

    /// `Some(Some(mark))` for a mark tag, `Some(None)` for a tag that only
    /// looks like one (a span without usable style)
    fn mark_for(&self, tag: &str, raw: &HashMap<String, String>) -> Option<Option<Mark>> {
        let spec = match tag {
            "b" => self.schema.mark_spec(BOLD),
            "i" => self.schema.mark_spec(ITALIC),
            _ => self.schema.mark_for_tag(tag),
        }?;
        Some(parse_mark(spec, raw))
    }

    fn text(&mut self, text: &str) {
        if self.skipping() || text.is_empty() {
            return;
        }
        let index = self.node_frame();
        let content = self.stack[index].content;
        match content {
            ContentExpr::Text => {
                self.stack[index].children.push(Node::text(text, vec![]));
            }
            ContentExpr::Inline => {
                let marks = self.active_marks();
                self.stack[index].children.push(Node::text(text, marks));
            }
            other if accepts_wrapped_inline(other) => {
                if text.trim().is_empty() && self.stack[index].pending_inline.is_empty() {
                    return;
                }
                let marks = self.active_marks();
                self.stack[index].pending_inline.push(Node::text(text, marks));
            }
            _ => {
                if !text.trim().is_empty() {
                    debug!(text = %text.trim(), "Dropping text outside any textblock");
                }
            }
        }
    }

    fn append(&mut self, node: Node, group: NodeGroup) {
        let index = self.node_frame();
        let frame = &mut self.stack[index];
        match group {
            NodeGroup::Inline if !frame.content.is_inline() => frame.pending_inline.push(node),
            _ => {
                flush_inline(frame);
                frame.children.push(node);
            }
        }
    }

    fn close(&mut self, tag: &str) -> Result<(), MarkupError> {
        if self.stack.len() <= 1 {
            return Err(MarkupError::UnexpectedClose(tag.to_string()));
        }
        self.pop_frame();
        Ok(())
    }

    fn pop_frame(&mut self) {
        let Some(mut frame) = self.stack.pop() else {
            return;
        };
        match std::mem::replace(&mut frame.kind, FrameKind::Skip) {
            FrameKind::Node { type_name, attrs } => {
                flush_inline(&mut frame);
                ensure_block_content(frame.content, &mut frame.children);
                let el = Element::container(type_name, attrs, frame.children);
                let group = self
                    .schema
                    .node_spec(&el.type_name)
                    .map_or(NodeGroup::Block, |s| s.group);
                self.append(el.into(), group);
            }
            FrameKind::Mark(_) | FrameKind::Transparent | FrameKind::Skip => {}
        }
    }

    fn finish(mut self) -> (Document, ParseReport) {
        while self.stack.len() > 1 {
            let tag = self.stack.last().map(|f| f.tag.clone()).unwrap_or_default();
            debug!(tag = %tag, "Closing unclosed element");
            self.pop_frame();
        }

        let mut root = match self.stack.pop() {
            Some(root) => root,
            None => return (Document::default(), self.report),
        };
        flush_inline(&mut root);
        ensure_block_content(root.content, &mut root.children);
        (Document::new(root.children), self.report)
    }
}

/// Inner mark of the same type wins per attribute; null attributes inherit
fn nested_mark(outer: &[Mark], inner: &Mark) -> Mark {
    let Some(enclosing) = outer.iter().find(|m| m.type_name == inner.type_name) else {
        return inner.clone();
    };
    let mut attrs = enclosing.attrs.clone();
    for (name, value) in &inner.attrs {
        if !value.is_null() {
            attrs.insert(name.clone(), value.clone());
        }
    }
    Mark::with_attrs(inner.type_name.clone(), attrs)
}

fn accepts_wrapped_inline(content: ContentExpr) -> bool {
    matches!(content, ContentExpr::Blocks | ContentExpr::ListItemBody)
}

fn flush_inline(frame: &mut Frame) {
    if frame.pending_inline.is_empty() {
        return;
    }
    let mut inline = std::mem::take(&mut frame.pending_inline);
    // Trailing whitespace from pretty-printed markup
    while matches!(inline.last(), Some(Node::Text(t)) if t.text.trim().is_empty()) {
        inline.pop();
    }
    if !inline.is_empty() {
        frame
            .children
            .push(Element::container(PARAGRAPH, Attrs::new(), inline).into());
    }
}

fn ensure_block_content(content: ContentExpr, children: &mut Vec<Node>) {
    if accepts_wrapped_inline(content) && children.is_empty() {
        children.push(Element::container(PARAGRAPH, Attrs::new(), vec![]).into());
    }
}

fn raw_attributes(e: &BytesStart<'_>) -> HashMap<String, String> {
    let mut raw = HashMap::new();
    for attr in e.attributes() {
        match attr {
            Ok(attr) => {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                match attr.unescape_value() {
                    Ok(value) => {
                        raw.insert(key, value.into_owned());
                    }
                    Err(err) => debug!(key = %key, error = %err, "Unreadable attribute value"),
                }
            }
            Err(err) => debug!(error = %err, "Malformed attribute"),
        }
    }
    raw
}

fn parse_attrs(spec: &NodeSpec, tag: &str, raw: &HashMap<String, String>) -> Attrs {
    let mut attrs = parse_with_specs(&spec.attrs, raw);
    if let Some(level) = heading_level(tag) {
        if spec.attr_spec("level").is_some() {
            attrs.insert("level".to_string(), AttrValue::Int(level));
        }
    }
    attrs
}

fn parse_with_specs(specs: &[AttributeSpec], raw: &HashMap<String, String>) -> Attrs {
    specs
        .iter()
        .map(|spec| {
            let value = if spec.serialize {
                spec.parse(raw.get(&spec.markup_name()).map(String::as_str))
            } else {
                spec.default.clone()
            };
            (spec.name.clone(), value)
        })
        .collect()
}

fn parse_mark(spec: &MarkSpec, raw: &HashMap<String, String>) -> Option<Mark> {
    match spec.markup {
        MarkMarkup::Tag(_) => Some(Mark::with_attrs(spec.name.clone(), parse_with_specs(&spec.attrs, raw))),
        MarkMarkup::Style => {
            let style = raw.get("style")?;
            let declarations = parse_style(style);
            let attrs: Attrs = spec
                .attrs
                .iter()
                .map(|attr| {
                    let value = attr.parse(declarations.get(&attr.style_property()).map(String::as_str));
                    (attr.name.clone(), value)
                })
                .collect();
            if attrs.values().all(AttrValue::is_null) {
                return None;
            }
            Some(Mark::with_attrs(spec.name.clone(), attrs))
        }
    }
}

fn parse_style(style: &str) -> HashMap<String, String> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            (!property.is_empty() && !value.is_empty()).then(|| (property, value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::standard().unwrap()
    }

    #[test]
    fn test_parse_style_declarations() {
        let style = parse_style("color: #ff0000; FONT-SIZE:14px;;bogus");
        assert_eq!(style.get("color").map(String::as_str), Some("#ff0000"));
        assert_eq!(style.get("font-size").map(String::as_str), Some("14px"));
        assert_eq!(style.len(), 2);
    }

    #[test]
    fn test_empty_markup_gives_one_paragraph() {
        let doc = parse("", &schema()).unwrap();
        assert_eq!(doc.content().len(), 1);
        assert_eq!(doc.content()[0].type_name(), "paragraph");
    }

    #[test]
    fn test_stray_close_is_an_error() {
        let err = parse("<p>a</p></p>", &schema()).unwrap_err();
        assert!(matches!(
            err,
            MarkupError::UnexpectedClose(_) | MarkupError::Malformed { .. }
        ));
    }

    #[test]
    fn test_unstyled_span_is_transparent() {
        let doc = parse("<p><span>a</span>b</p>", &schema()).unwrap();
        let para = doc.content()[0].as_element().unwrap();
        assert_eq!(para.children(), &[Node::text("ab", vec![])]);
    }
}
