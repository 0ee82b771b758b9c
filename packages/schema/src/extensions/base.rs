//! Structural node types and the standard marks.

use crate::codec::AttributeSpec;
use crate::error::SchemaError;
use crate::registry::SchemaBuilder;
use crate::spec::{ContentExpr, MarkMarkup, MarkSpec, NodeMarkup, NodeSpec};

pub const DOC: &str = postcraft_model::ROOT_TYPE;
pub const PARAGRAPH: &str = "paragraph";
pub const HEADING: &str = "heading";
pub const BLOCKQUOTE: &str = "blockquote";
pub const BULLET_LIST: &str = "bullet-list";
pub const ORDERED_LIST: &str = "ordered-list";
pub const LIST_ITEM: &str = "list-item";
pub const CODE_BLOCK: &str = "code-block";
pub const HORIZONTAL_RULE: &str = "horizontal-rule";
pub const HARD_BREAK: &str = "hard-break";
pub const TEXT: &str = "text";

pub const LINK: &str = "link";
pub const TEXT_STYLE: &str = "text-style";
pub const BOLD: &str = "bold";
pub const ITALIC: &str = "italic";
pub const CODE: &str = "code";

pub(crate) fn register(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder
        .register(NodeSpec::block(DOC, ContentExpr::Blocks).markup(NodeMarkup::Skip))?
        .register(NodeSpec::block(PARAGRAPH, ContentExpr::Inline).markup(NodeMarkup::Tag("p")))?
        .register(
            NodeSpec::block(HEADING, ContentExpr::Inline)
                .attr(AttributeSpec::integer("level").with_default(1i64).transient())
                .markup(NodeMarkup::Heading),
        )?
        .register(
            NodeSpec::block(BLOCKQUOTE, ContentExpr::Blocks).markup(NodeMarkup::Tag("blockquote")),
        )?
        .register(NodeSpec::block(BULLET_LIST, ContentExpr::ListItems).markup(NodeMarkup::Tag("ul")))?
        .register(
            NodeSpec::block(ORDERED_LIST, ContentExpr::ListItems)
                .attr(
                    AttributeSpec::integer("start")
                        .with_default(1i64)
                        .with_markup_name("start"),
                )
                .markup(NodeMarkup::Tag("ol")),
        )?
        .register(
            NodeSpec::block(LIST_ITEM, ContentExpr::ListItemBody).markup(NodeMarkup::Tag("li")),
        )?
        .register(
            NodeSpec::block(CODE_BLOCK, ContentExpr::Text)
                .code()
                .attr(AttributeSpec::text("language"))
                .markup(NodeMarkup::Tag("pre")),
        )?
        .register(
            NodeSpec::block(HORIZONTAL_RULE, ContentExpr::None).markup(NodeMarkup::Tag("hr")),
        )?
        .register(NodeSpec::inline(HARD_BREAK, ContentExpr::None).markup(NodeMarkup::Tag("br")))?
        .register(NodeSpec::inline(TEXT, ContentExpr::None).markup(NodeMarkup::Skip))?;

    builder
        .register_mark(
            MarkSpec::new(LINK, MarkMarkup::Tag("a"))
                .attr(AttributeSpec::text("href").with_markup_name("href"))
                .attr(AttributeSpec::text("target").with_markup_name("target"))
                .attr(AttributeSpec::text("rel").with_markup_name("rel"))
                .non_inclusive(),
        )?
        .register_mark(
            MarkSpec::new(TEXT_STYLE, MarkMarkup::Style)
                .attr(AttributeSpec::text("color"))
                .attr(AttributeSpec::text("fontSize")),
        )?
        .register_mark(MarkSpec::new(BOLD, MarkMarkup::Tag("strong")))?
        .register_mark(MarkSpec::new(ITALIC, MarkMarkup::Tag("em")))?
        .register_mark(MarkSpec::new(CODE, MarkMarkup::Tag("code")))?;

    Ok(())
}
