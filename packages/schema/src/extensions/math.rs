//! Inline math.

use crate::codec::AttributeSpec;
use crate::error::SchemaError;
use crate::registry::SchemaBuilder;
use crate::spec::{ContentExpr, NodeFamily, NodeSpec};
use crate::view::atom_view;
use postcraft_model::{attrs, Element};

pub const INLINE_MATH: &str = "inline-math";
pub const FORMULA: &str = "formula";

pub(crate) fn register(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.register(
        NodeSpec::inline(INLINE_MATH, ContentExpr::None)
            .atom()
            .attr(AttributeSpec::text(FORMULA).with_default(""))
            .family(NodeFamily::InlineAtom)
            .view(atom_view(false))
            .command("insert_inline_math"),
    )?;
    Ok(())
}

/// Inline math node for a TeX-like formula
pub fn inline_math(formula: &str) -> Element {
    Element::leaf(INLINE_MATH, attrs! { FORMULA => formula })
}
