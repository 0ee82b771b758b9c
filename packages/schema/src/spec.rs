//! Node and mark type declarations.

use crate::codec::AttributeSpec;
use crate::extensions::{MediaKind, PlaceholderKind};
use crate::view::ViewFactory;

/// Closed set of content expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentExpr {
    /// Leaf: no content at all
    None,
    /// `inline*`
    Inline,
    /// `text*` (no inline leaves, no marks)
    Text,
    /// `block+`
    Blocks,
    /// `list-item+`
    ListItems,
    /// `paragraph block*`
    ListItemBody,
}

impl ContentExpr {
    pub fn is_leaf(&self) -> bool {
        matches!(self, ContentExpr::None)
    }

    /// Whether the content is a run of inline nodes
    pub fn is_inline(&self) -> bool {
        matches!(self, ContentExpr::Inline | ContentExpr::Text)
    }

    /// Whether a child of the given type may appear in this content
    pub fn allows(&self, child: &NodeSpec) -> bool {
        match self {
            ContentExpr::None => false,
            ContentExpr::Inline => child.group == NodeGroup::Inline,
            ContentExpr::Text => child.name == crate::extensions::TEXT,
            ContentExpr::Blocks | ContentExpr::ListItemBody => child.group == NodeGroup::Block,
            ContentExpr::ListItems => child.name == crate::extensions::LIST_ITEM,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentExpr::None => "none",
            ContentExpr::Inline => "inline*",
            ContentExpr::Text => "text*",
            ContentExpr::Blocks => "block+",
            ContentExpr::ListItems => "list-item+",
            ContentExpr::ListItemBody => "paragraph block*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeGroup {
    Block,
    Inline,
}

/// How a node type appears in persisted markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMarkup {
    /// Conventional tag (`p`, `ul`, `blockquote`...)
    Tag(&'static str),
    /// `h1`..`h6` chosen by the `level` attribute
    Heading,
    /// Element named after the type (`<image data-src="..."/>`)
    TypeName,
    /// Never written (placeholders, the root)
    Skip,
}

/// Which family a type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFamily {
    Structural,
    Media(MediaKind),
    Placeholder(PlaceholderKind),
    InlineAtom,
}

/// Declaration of a node type
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: String,
    pub content: ContentExpr,
    pub group: NodeGroup,
    /// Edited as a single unit
    pub atom: bool,
    pub draggable: bool,
    /// Edits never cross the node's boundary
    pub isolating: bool,
    /// Holds source code; pattern triggers stay off
    pub code: bool,
    pub attrs: Vec<AttributeSpec>,
    pub markup: NodeMarkup,
    pub family: NodeFamily,
    pub view: Option<ViewFactory>,
    /// Host commands contributed by the type
    pub commands: Vec<&'static str>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, content: ContentExpr, group: NodeGroup) -> Self {
        Self {
            name: name.into(),
            content,
            group,
            atom: false,
            draggable: false,
            isolating: false,
            code: false,
            attrs: Vec::new(),
            markup: NodeMarkup::TypeName,
            family: NodeFamily::Structural,
            view: None,
            commands: Vec::new(),
        }
    }

    pub fn block(name: impl Into<String>, content: ContentExpr) -> Self {
        Self::new(name, content, NodeGroup::Block)
    }

    pub fn inline(name: impl Into<String>, content: ContentExpr) -> Self {
        Self::new(name, content, NodeGroup::Inline)
    }

    pub fn atom(mut self) -> Self {
        self.atom = true;
        self
    }

    pub fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    pub fn isolating(mut self) -> Self {
        self.isolating = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }

    pub fn attr(mut self, attr: AttributeSpec) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn markup(mut self, markup: NodeMarkup) -> Self {
        self.markup = markup;
        self
    }

    pub fn family(mut self, family: NodeFamily) -> Self {
        self.family = family;
        self
    }

    pub fn view(mut self, view: ViewFactory) -> Self {
        self.view = Some(view);
        self
    }

    pub fn command(mut self, name: &'static str) -> Self {
        self.commands.push(name);
        self
    }

    pub fn attr_spec(&self, name: &str) -> Option<&AttributeSpec> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn is_leaf(&self) -> bool {
        self.content.is_leaf()
    }

    pub fn is_textblock(&self) -> bool {
        self.group == NodeGroup::Block && self.content.is_inline()
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.family, NodeFamily::Placeholder(_))
    }
}

/// How a mark appears in persisted markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkMarkup {
    /// Wrapping element (`a`, `strong`...)
    Tag(&'static str),
    /// `<span style="...">` with one CSS property per attribute
    Style,
}

/// Declaration of a mark type
#[derive(Debug, Clone)]
pub struct MarkSpec {
    pub name: String,
    pub attrs: Vec<AttributeSpec>,
    /// Typing at the end of the mark extends it
    pub inclusive: bool,
    pub markup: MarkMarkup,
}

impl MarkSpec {
    pub fn new(name: impl Into<String>, markup: MarkMarkup) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            inclusive: true,
            markup,
        }
    }

    pub fn attr(mut self, attr: AttributeSpec) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn non_inclusive(mut self) -> Self {
        self.inclusive = false;
        self
    }

    pub fn attr_spec(&self, name: &str) -> Option<&AttributeSpec> {
        self.attrs.iter().find(|a| a.name == name)
    }
}
