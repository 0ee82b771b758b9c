//! # Postcraft Markup
//!
//! Persisted form of a post: an XML-compatible fragment where each node is an
//! element tagged with its type (or a conventional tag for structural types)
//! and attributes are written through their codecs.
//!
//! ```text
//! <p>See <a href="https://example.com">this</a></p>
//! <image data-src="cat.png" data-width="320"/>
//! <audio data-src="a.mp3" data-waveform-data="[0.1,0.8]"/>
//! ```
//!
//! Serialization is lossless for every registered, persistable type.
//! Placeholders are session-only and never written.

mod error;
mod parser;
mod serializer;

pub use error::MarkupError;
pub use parser::{parse, parse_with_report, DropReason, DroppedElement, ParseReport};
pub use serializer::serialize;
