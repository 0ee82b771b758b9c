//! Document → markup.
//!
//! Placeholders and unregistered types are skipped. Marks are opened in
//! registry rank order and reused across adjacent text runs, so a link
//! spanning differently styled text is written once.

use postcraft_model::{Attrs, Document, Element, Mark, Node};
use postcraft_schema::{AttributeSpec, MarkMarkup, NodeMarkup, Schema};
use quick_xml::escape::escape;
use tracing::{debug, instrument, warn};

/// Serialize a document to markup
#[instrument(skip_all, fields(size = doc.size()))]
pub fn serialize(doc: &Document, schema: &Schema) -> String {
    let mut writer = MarkupWriter {
        schema,
        out: String::new(),
    };
    writer.write_content(doc.content());
    writer.out
}

struct MarkupWriter<'s> {
    schema: &'s Schema,
    out: String,
}

impl MarkupWriter<'_> {
    fn write_content(&mut self, nodes: &[Node]) {
        let mut open: Vec<&Mark> = Vec::new();

        for node in nodes {
            let mut marks: Vec<&Mark> = node.marks().iter().collect();
            marks.sort_by_key(|m| self.schema.mark_rank(&m.type_name));

            let keep = open
                .iter()
                .zip(marks.iter())
                .take_while(|(a, b)| a == b)
                .count();
            while open.len() > keep {
                if let Some(mark) = open.pop() {
                    self.close_mark(mark);
                }
            }
            for &mark in &marks[keep..] {
                self.open_mark(mark);
                open.push(mark);
            }

            match node {
                Node::Text(text) => self.out.push_str(&escape(text.text.as_str())),
                Node::Element(el) => self.write_element(el),
            }
        }

        while let Some(mark) = open.pop() {
            self.close_mark(mark);
        }
    }

    fn write_element(&mut self, el: &Element) {
        let Some(spec) = self.schema.node_spec(&el.type_name) else {
            warn!(type_name = %el.type_name, "Skipping unregistered node type");
            return;
        };

        let tag = match spec.markup {
            NodeMarkup::Skip => {
                debug!(type_name = %el.type_name, "Node not persisted");
                return;
            }
            NodeMarkup::Tag(tag) => tag.to_string(),
            NodeMarkup::TypeName => spec.name.clone(),
            NodeMarkup::Heading => {
                let level = el.attr("level").as_i64().unwrap_or(1).clamp(1, 6);
                format!("h{}", level)
            }
        };

        self.out.push('<');
        self.out.push_str(&tag);
        self.write_attrs(&spec.attrs, &el.attrs);

        if el.is_leaf() {
            self.out.push_str("/>");
            return;
        }

        self.out.push('>');
        self.write_content(el.children());
        self.out.push_str("</");
        self.out.push_str(&tag);
        self.out.push('>');
    }

    fn write_attrs(&mut self, specs: &[AttributeSpec], attrs: &Attrs) {
        for spec in specs.iter().filter(|s| s.serialize) {
            let value = attrs.get(&spec.name).unwrap_or(&spec.default);
            if let Some(rendered) = spec.render(value) {
                self.out.push(' ');
                self.out.push_str(&spec.markup_name());
                self.out.push_str("=\"");
                self.out.push_str(&escape(rendered.as_str()));
                self.out.push('"');
            }
        }
    }

    fn open_mark(&mut self, mark: &Mark) {
        let Some(spec) = self.schema.mark_spec(&mark.type_name) else {
            return;
        };
        match spec.markup {
            MarkMarkup::Tag(tag) => {
                self.out.push('<');
                self.out.push_str(tag);
                self.write_attrs(&spec.attrs, &mark.attrs);
                self.out.push('>');
            }
            MarkMarkup::Style => {
                let declarations: Vec<String> = spec
                    .attrs
                    .iter()
                    .filter_map(|attr| {
                        let value = mark.attrs.get(&attr.name).unwrap_or(&attr.default);
                        attr.render(value)
                            .map(|v| format!("{}: {}", attr.style_property(), v))
                    })
                    .collect();
                if declarations.is_empty() {
                    self.out.push_str("<span>");
                } else {
                    self.out.push_str("<span style=\"");
                    self.out.push_str(&escape(declarations.join("; ").as_str()));
                    self.out.push_str("\">");
                }
            }
        }
    }

    fn close_mark(&mut self, mark: &Mark) {
        let Some(spec) = self.schema.mark_spec(&mark.type_name) else {
            return;
        };
        let tag = match spec.markup {
            MarkMarkup::Tag(tag) => tag,
            MarkMarkup::Style => "span",
        };
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_model::attrs;
    use postcraft_schema::extensions::{inline_math, GALLERY_PLACEHOLDER, LINK, PLACEHOLDER_ID};

    fn schema() -> Schema {
        Schema::standard().unwrap()
    }

    fn paragraph(nodes: Vec<Node>) -> Node {
        Element::container("paragraph", attrs! {}, nodes).into()
    }

    #[test]
    fn test_media_attributes_use_data_names() {
        let schema = schema();
        let image = schema
            .leaf("image", &attrs! { "src" => "cat.png", "width" => 320.0, "mediaId" => "m1" })
            .unwrap();
        let doc = Document::new(vec![image.into()]);

        assert_eq!(
            serialize(&doc, &schema),
            r#"<image data-src="cat.png" data-width="320" data-media-id="m1"/>"#
        );
    }

    #[test]
    fn test_marks_nest_by_rank() {
        let link = Mark::with_attrs(LINK, attrs! { "href" => "https://a.b" });
        let bold = Mark::new("bold");
        let doc = Document::new(vec![paragraph(vec![
            Node::text("a", vec![link.clone()]),
            Node::text("b", vec![bold.clone(), link.clone()]),
            Node::text("c", vec![bold]),
        ])]);

        assert_eq!(
            serialize(&doc, &schema()),
            r#"<p><a href="https://a.b">a<strong>b</strong></a><strong>c</strong></p>"#
        );
    }

    #[test]
    fn test_text_style_becomes_span() {
        let style = Mark::with_attrs("text-style", attrs! { "color" => "#ff0000", "fontSize" => "14px" });
        let doc = Document::new(vec![paragraph(vec![Node::text("x", vec![style])])]);
        assert_eq!(
            serialize(&doc, &schema()),
            r#"<p><span style="color: #ff0000; font-size: 14px">x</span></p>"#
        );
    }

    #[test]
    fn test_placeholders_are_skipped() {
        let placeholder = Element::container(
            GALLERY_PLACEHOLDER,
            attrs! { PLACEHOLDER_ID => 1i64 },
            vec![],
        );
        let doc = Document::new(vec![
            paragraph(vec![Node::text("a", vec![])]),
            placeholder.into(),
        ]);
        assert_eq!(serialize(&doc, &schema()), "<p>a</p>");
    }

    #[test]
    fn test_heading_and_inline_atom() {
        let doc = Document::new(vec![
            Element::container("heading", attrs! { "level" => 2i64 }, vec![Node::text("T", vec![])]).into(),
            paragraph(vec![Node::text("e=", vec![]), inline_math("mc^2").into()]),
        ]);
        assert_eq!(
            serialize(&doc, &schema()),
            r#"<h2>T</h2><p>e=<inline-math data-formula="mc^2"/></p>"#
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = Document::new(vec![paragraph(vec![Node::text("a < b & c", vec![])])]);
        assert_eq!(serialize(&doc, &schema()), "<p>a &lt; b &amp; c</p>");
    }
}
