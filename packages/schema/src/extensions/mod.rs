//! Built-in content types.
//!
//! Each submodule registers one family into a [`SchemaBuilder`]:
//!
//! - `base`: document structure and the standard marks
//! - `media`: image, audio, gallery, URL preview, map
//! - `placeholder`: unresolved counterparts of the async media types
//! - `math`: inline formulas

mod base;
mod math;
mod media;
mod placeholder;

pub use base::{
    BLOCKQUOTE, BOLD, BULLET_LIST, CODE, CODE_BLOCK, DOC, HARD_BREAK, HEADING, HORIZONTAL_RULE,
    ITALIC, LINK, LIST_ITEM, ORDERED_LIST, PARAGRAPH, TEXT, TEXT_STYLE,
};
pub use math::{inline_math, FORMULA, INLINE_MATH};
pub use media::{
    Align, AudioAttrs, GalleryImage, GeoPoint, ImageAttrs, MediaKind, MediaRecord, UrlMetadata,
    AUDIO, DEFAULT_ZOOM, GALLERY, GEOLOCATION, IMAGE, URL_EMBED,
};
pub use placeholder::{
    PlaceholderKind, GALLERY_PLACEHOLDER, GEOLOCATION_PLACEHOLDER, PLACEHOLDER_ID,
    URL_EMBED_PLACEHOLDER,
};

use crate::error::SchemaError;
use crate::registry::SchemaBuilder;

/// Register every built-in type
pub(crate) fn register_all(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    base::register(builder)?;
    math::register(builder)?;
    media::register(builder)?;
    placeholder::register(builder)?;
    Ok(())
}
