//! Placeholder node types.
//!
//! A placeholder stands in for a media node whose content is still being
//! looked up. Its inline content is the pending input (a URL being typed, a
//! place name). Placeholders are session-only: they are never serialized.

use super::media::{MediaKind, GALLERY, GEOLOCATION, URL_EMBED};
use crate::codec::AttributeSpec;
use crate::error::SchemaError;
use crate::registry::SchemaBuilder;
use crate::spec::{ContentExpr, NodeFamily, NodeMarkup, NodeSpec};
use crate::view::placeholder_view;

pub const GALLERY_PLACEHOLDER: &str = "gallery-placeholder";
pub const URL_EMBED_PLACEHOLDER: &str = "url-embed-placeholder";
pub const GEOLOCATION_PLACEHOLDER: &str = "geolocation-placeholder";

/// Session-local identity attribute
pub const PLACEHOLDER_ID: &str = "placeholderId";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Gallery,
    UrlEmbed,
    Geolocation,
}

impl PlaceholderKind {
    pub const ALL: [PlaceholderKind; 3] = [
        PlaceholderKind::Gallery,
        PlaceholderKind::UrlEmbed,
        PlaceholderKind::Geolocation,
    ];

    /// Registry name of the placeholder node
    pub fn node_type(&self) -> &'static str {
        match self {
            PlaceholderKind::Gallery => GALLERY_PLACEHOLDER,
            PlaceholderKind::UrlEmbed => URL_EMBED_PLACEHOLDER,
            PlaceholderKind::Geolocation => GEOLOCATION_PLACEHOLDER,
        }
    }

    /// Registry name of the node that replaces the placeholder
    pub fn target_type(&self) -> &'static str {
        match self {
            PlaceholderKind::Gallery => GALLERY,
            PlaceholderKind::UrlEmbed => URL_EMBED,
            PlaceholderKind::Geolocation => GEOLOCATION,
        }
    }

    pub fn target_kind(&self) -> MediaKind {
        match self {
            PlaceholderKind::Gallery => MediaKind::Gallery,
            PlaceholderKind::UrlEmbed => MediaKind::UrlEmbed,
            PlaceholderKind::Geolocation => MediaKind::Geolocation,
        }
    }

    pub fn from_node_type(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.node_type() == name)
    }
}

pub(crate) fn register(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    for kind in PlaceholderKind::ALL {
        builder.register(
            NodeSpec::block(kind.node_type(), ContentExpr::Inline)
                .atom()
                .isolating()
                .attr(AttributeSpec::integer(PLACEHOLDER_ID).transient())
                .markup(NodeMarkup::Skip)
                .family(NodeFamily::Placeholder(kind))
                .view(placeholder_view())
                .command("insert_placeholder"),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_lookup() {
        for kind in PlaceholderKind::ALL {
            assert_eq!(PlaceholderKind::from_node_type(kind.node_type()), Some(kind));
            assert_eq!(kind.target_kind().type_name(), kind.target_type());
        }
        assert_eq!(PlaceholderKind::from_node_type("gallery"), None);
    }
}
