//! # Node Type Registry
//!
//! Maps type names to their declarations. Built once per session through a
//! [`SchemaBuilder`] and shared read-only afterwards.
//!
//! ## Registration rules
//! - A node or mark name can be registered once (`DuplicateType`)
//! - `doc` and `text` must be present
//! - Attribute names are unique within a declaration
//!
//! Registration order is meaningful for marks: earlier marks wrap later ones
//! when serialized.

use crate::codec::AttributeSpec;
use crate::error::SchemaError;
use crate::extensions::{self, DOC, TEXT};
use crate::spec::{ContentExpr, MarkMarkup, MarkSpec, NodeMarkup, NodeSpec};
use postcraft_model::{Attrs, Element, Mark, Node};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    nodes: Vec<NodeSpec>,
    marks: Vec<MarkSpec>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type
    pub fn register(&mut self, spec: NodeSpec) -> Result<&mut Self, SchemaError> {
        if self.nodes.iter().any(|n| n.name == spec.name) {
            return Err(SchemaError::DuplicateType(spec.name));
        }
        check_attrs(&spec.name, &spec.attrs)?;
        self.nodes.push(spec);
        Ok(self)
    }

    /// Register a mark type
    pub fn register_mark(&mut self, spec: MarkSpec) -> Result<&mut Self, SchemaError> {
        if self.marks.iter().any(|m| m.name == spec.name) {
            return Err(SchemaError::DuplicateType(spec.name));
        }
        check_attrs(&spec.name, &spec.attrs)?;
        self.marks.push(spec);
        Ok(self)
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        for required in [DOC, TEXT] {
            if !self.nodes.iter().any(|n| n.name == required) {
                return Err(SchemaError::UnknownType(required.to_string()));
            }
        }

        let node_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect();
        let mark_index = self
            .marks
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();

        debug!(
            nodes = self.nodes.len(),
            marks = self.marks.len(),
            "Schema built"
        );

        Ok(Schema {
            nodes: self.nodes,
            marks: self.marks,
            node_index,
            mark_index,
        })
    }
}

fn check_attrs(type_name: &str, attrs: &[AttributeSpec]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for attr in attrs {
        if !seen.insert(attr.name.as_str()) {
            return Err(SchemaError::invalid_spec(
                type_name,
                format!("attribute {} declared twice", attr.name),
            ));
        }
    }
    Ok(())
}

/// Registry of node and mark types
#[derive(Debug)]
pub struct Schema {
    nodes: Vec<NodeSpec>,
    marks: Vec<MarkSpec>,
    node_index: HashMap<String, usize>,
    mark_index: HashMap<String, usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Registry with every built-in type
    pub fn standard() -> Result<Schema, SchemaError> {
        let mut builder = SchemaBuilder::new();
        extensions::register_all(&mut builder)?;
        builder.build()
    }

    /// Look up a node type, failing on unknown names
    pub fn resolve(&self, type_name: &str) -> Result<&NodeSpec, SchemaError> {
        self.node_spec(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))
    }

    pub fn resolve_mark(&self, type_name: &str) -> Result<&MarkSpec, SchemaError> {
        self.mark_spec(type_name)
            .ok_or_else(|| SchemaError::UnknownMark(type_name.to_string()))
    }

    pub fn node_spec(&self, type_name: &str) -> Option<&NodeSpec> {
        self.node_index.get(type_name).map(|&i| &self.nodes[i])
    }

    pub fn mark_spec(&self, type_name: &str) -> Option<&MarkSpec> {
        self.mark_index.get(type_name).map(|&i| &self.marks[i])
    }

    pub fn node_types(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn mark_types(&self) -> &[MarkSpec] {
        &self.marks
    }

    /// Node type written with the given markup tag
    pub fn node_for_tag(&self, tag: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|spec| match spec.markup {
            NodeMarkup::Tag(t) => t == tag,
            NodeMarkup::TypeName => spec.name == tag,
            NodeMarkup::Heading => heading_level(tag).is_some(),
            NodeMarkup::Skip => false,
        })
    }

    pub fn mark_for_tag(&self, tag: &str) -> Option<&MarkSpec> {
        self.marks.iter().find(|spec| match spec.markup {
            MarkMarkup::Tag(t) => t == tag,
            MarkMarkup::Style => tag == "span",
        })
    }

    /// Nesting rank; lower ranks wrap higher ones
    pub fn mark_rank(&self, type_name: &str) -> usize {
        self.mark_index.get(type_name).copied().unwrap_or(usize::MAX)
    }

    /// Fill defaults and drop undeclared attributes
    pub fn normalize_attrs(&self, type_name: &str, attrs: &Attrs) -> Result<Attrs, SchemaError> {
        let spec = self.resolve(type_name)?;
        Ok(normalize_with(&spec.attrs, attrs))
    }

    pub fn normalize_mark_attrs(&self, type_name: &str, attrs: &Attrs) -> Result<Attrs, SchemaError> {
        let spec = self.resolve_mark(type_name)?;
        Ok(normalize_mark_with(spec, attrs))
    }

    /// Build a leaf element with normalized attributes
    pub fn leaf(&self, type_name: &str, attrs: &Attrs) -> Result<Element, SchemaError> {
        let spec = self.resolve(type_name)?;
        if !spec.is_leaf() {
            return Err(SchemaError::invalid_spec(type_name, "not a leaf type"));
        }
        Ok(Element::leaf(type_name, normalize_with(&spec.attrs, attrs)))
    }

    /// Build a container element with normalized attributes
    pub fn container(
        &self,
        type_name: &str,
        attrs: &Attrs,
        content: Vec<Node>,
    ) -> Result<Element, SchemaError> {
        let spec = self.resolve(type_name)?;
        if spec.is_leaf() {
            return Err(SchemaError::invalid_spec(type_name, "leaf types take no content"));
        }
        Ok(Element::container(
            type_name,
            normalize_with(&spec.attrs, attrs),
            content,
        ))
    }

    /// Build a mark with normalized attributes
    pub fn mark(&self, type_name: &str, attrs: &Attrs) -> Result<Mark, SchemaError> {
        let spec = self.resolve_mark(type_name)?;
        Ok(Mark::with_attrs(type_name, normalize_mark_with(spec, attrs)))
    }

    pub fn is_textblock(&self, type_name: &str) -> bool {
        self.node_spec(type_name).is_some_and(NodeSpec::is_textblock)
    }

    pub fn is_atom(&self, type_name: &str) -> bool {
        self.node_spec(type_name).is_some_and(|spec| spec.atom)
    }

    pub fn is_placeholder(&self, type_name: &str) -> bool {
        self.node_spec(type_name).is_some_and(NodeSpec::is_placeholder)
    }

    /// Whether typing at the end of the mark extends it
    pub fn is_inclusive(&self, mark: &Mark) -> bool {
        self.mark_spec(&mark.type_name).map_or(true, |spec| spec.inclusive)
    }

    /// Whether `parent` may hold a child of type `child`
    pub fn allows_child(&self, parent: &str, child: &str) -> bool {
        match (self.node_spec(parent), self.node_spec(child)) {
            (Some(parent), Some(child)) => parent.content.allows(child),
            _ => false,
        }
    }

    /// Content expression of the root
    pub fn root_content(&self) -> ContentExpr {
        self.node_spec(DOC)
            .map_or(ContentExpr::Blocks, |spec| spec.content)
    }

    /// Every command name contributed by registered types
    pub fn commands(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for spec in &self.nodes {
            for &name in &spec.commands {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// `h1`..`h6` to a heading level
pub fn heading_level(tag: &str) -> Option<i64> {
    let level = tag.strip_prefix('h')?.parse::<i64>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn normalize_with(specs: &[AttributeSpec], attrs: &Attrs) -> Attrs {
    specs
        .iter()
        .map(|spec| {
            let value = match attrs.get(&spec.name) {
                Some(value) => spec.normalize(value),
                None => spec.default.clone(),
            };
            (spec.name.clone(), value)
        })
        .collect()
}

/// Style marks become CSS declarations; a value that would split one falls
/// back to the default
fn normalize_mark_with(spec: &MarkSpec, attrs: &Attrs) -> Attrs {
    let mut normalized = normalize_with(&spec.attrs, attrs);
    if spec.markup != MarkMarkup::Style {
        return normalized;
    }
    for attr in &spec.attrs {
        let unsafe_value = normalized
            .get(&attr.name)
            .and_then(|v| v.as_str())
            .is_some_and(|v| v.contains(&[';', ':', '{', '}'][..]));
        if unsafe_value {
            debug!(mark = %spec.name, attr = %attr.name, "Rejecting style value");
            normalized.insert(attr.name.clone(), attr.default.clone());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{IMAGE, LINK};
    use postcraft_model::{attrs, AttrValue};

    #[test]
    fn test_duplicate_registration_fails() {
        let mut builder = Schema::builder();
        builder
            .register(NodeSpec::block(DOC, ContentExpr::Blocks))
            .unwrap();
        let err = builder
            .register(NodeSpec::block(DOC, ContentExpr::Blocks))
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateType("doc".to_string()));
    }

    #[test]
    fn test_build_requires_root_and_text() {
        let mut builder = Schema::builder();
        builder
            .register(NodeSpec::block(DOC, ContentExpr::Blocks))
            .unwrap();
        assert_eq!(
            builder.build().unwrap_err(),
            SchemaError::UnknownType("text".to_string())
        );
    }

    #[test]
    fn test_duplicate_attribute_is_invalid() {
        let mut builder = Schema::builder();
        let err = builder
            .register(
                NodeSpec::block("card", ContentExpr::None)
                    .attr(AttributeSpec::text("src"))
                    .attr(AttributeSpec::text("src")),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSpec { .. }));
    }

    #[test]
    fn test_resolve_unknown() {
        let schema = Schema::standard().unwrap();
        assert_eq!(
            schema.resolve("video").unwrap_err(),
            SchemaError::UnknownType("video".to_string())
        );
        assert!(schema.resolve(IMAGE).is_ok());
    }

    #[test]
    fn test_normalize_fills_defaults_and_drops_unknown() {
        let schema = Schema::standard().unwrap();
        let attrs = schema
            .normalize_attrs(IMAGE, &attrs! { "src" => "a.png", "bogus" => 1i64 })
            .unwrap();

        assert_eq!(attrs["src"], AttrValue::from("a.png"));
        assert_eq!(attrs["align"], AttrValue::from("center"));
        assert_eq!(attrs["width"], AttrValue::Null);
        assert!(!attrs.contains_key("bogus"));
    }

    #[test]
    fn test_tags_and_ranks() {
        let schema = Schema::standard().unwrap();
        assert_eq!(schema.node_for_tag("p").map(|s| s.name.as_str()), Some("paragraph"));
        assert_eq!(schema.node_for_tag("h3").map(|s| s.name.as_str()), Some("heading"));
        assert_eq!(schema.node_for_tag("h7").map(|s| s.name.as_str()), None);
        assert_eq!(schema.node_for_tag("image").map(|s| s.name.as_str()), Some("image"));
        assert!(schema.node_for_tag("gallery-placeholder").is_none());
        assert_eq!(schema.mark_for_tag("a").map(|s| s.name.as_str()), Some(LINK));
        assert!(schema.mark_rank(LINK) < schema.mark_rank("bold"));
    }

    #[test]
    fn test_style_values_cannot_split_declarations() {
        let schema = Schema::standard().unwrap();
        let mark = schema
            .mark(
                "text-style",
                &attrs! { "color" => "red; font-size: 90px", "fontSize" => "14px" },
            )
            .unwrap();
        assert_eq!(mark.attr("color"), &AttrValue::Null);
        assert_eq!(mark.attr("fontSize"), &AttrValue::from("14px"));

        let link = schema
            .mark(LINK, &attrs! { "href" => "https://a.b/?q=1;2" })
            .unwrap();
        assert_eq!(link.attr("href"), &AttrValue::from("https://a.b/?q=1;2"));
    }

    #[test]
    fn test_link_is_not_inclusive() {
        let schema = Schema::standard().unwrap();
        assert!(!schema.is_inclusive(&Mark::new(LINK)));
        assert!(schema.is_inclusive(&Mark::new("bold")));
    }
}
