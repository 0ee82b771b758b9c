//! # Postcraft Model
//!
//! The document engine consumed by the editing core.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: tree of nodes and marks              │
//! │  - integer position addressing              │
//! │  - steps: replace / mark / set attrs        │
//! │  - mapping of positions through steps       │
//! │  - transactions with selection + origin     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ schema: node types, attribute codecs        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: session, commands, post-effects     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The model is schema-agnostic: it validates positions and tree shape only.
//! Content rules live in `postcraft-schema` and are enforced by the commands
//! that build transactions.

mod attrs;
mod document;
mod error;
mod mapping;
mod node;
mod selection;
mod step;
mod transaction;

pub use attrs::{AttrValue, Attrs};
pub use document::{Document, ResolvedPos, TextRun, ROOT_TYPE};
pub use error::StepError;
pub use mapping::{Assoc, MapResult, Mapping, StepMap};
pub use node::{add_to_set, content_size, normalize, remove_from_set, Element, Mark, Node, TextNode};
pub use selection::Selection;
pub use step::Step;
pub use transaction::{Origin, Transaction};
