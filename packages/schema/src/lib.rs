//! # Postcraft Schema
//!
//! Node type registry and attribute codecs.
//!
//! Every content type declares its content model, its attributes (each with a
//! codec and a default), how it appears in markup, and the view and commands
//! it contributes. The registry is closed after [`SchemaBuilder::build`]; the
//! default registry is [`Schema::standard`].
//!
//! ```
//! use postcraft_schema::{extensions::IMAGE, Schema};
//! use postcraft_model::attrs;
//!
//! let schema = Schema::standard().unwrap();
//! let image = schema.leaf(IMAGE, &attrs! { "src" => "cat.png" }).unwrap();
//! assert_eq!(image.attr("align").as_str(), Some("center"));
//! ```

pub mod codec;
mod error;
pub mod extensions;
mod registry;
mod spec;
pub mod view;

pub use codec::{AttrCodec, AttributeSpec, JsonShape};
pub use error::SchemaError;
pub use registry::{heading_level, Schema, SchemaBuilder};
pub use spec::{ContentExpr, MarkMarkup, MarkSpec, NodeFamily, NodeGroup, NodeMarkup, NodeSpec};
pub use view::{AttributeUpdate, AttributeUpdater, NodeViewDescriptor, ViewFactory};
