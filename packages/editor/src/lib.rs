//! # Postcraft Editor
//!
//! Editing session for structured posts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ markup: persisted post ⇄ Document           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditorSession                       │
//! │  - commands build transactions              │
//! │  - input rules rewrite typed text           │
//! │  - dispatch commits, runs post-effects      │
//! │  - placeholders resolve asynchronously      │
//! │  - undo history, one entry per action       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ view layer: node views, context menus       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Single writer**: every change goes through [`EditorSession::dispatch`]
//! 2. **Explicit context**: commands and view hooks receive the session or an
//!    [`AttributeUpdater`](postcraft_schema::AttributeUpdater), never a global
//! 3. **Late results never misplace content**: a placeholder is replaced only
//!    while its node is intact at the tracked position
//!
//! ## Usage
//!
//! ```rust
//! use postcraft_editor::{commands, EditorConfig, EditorSession};
//! use postcraft_model::Selection;
//! use postcraft_schema::Schema;
//! use std::sync::Arc;
//!
//! let schema = Arc::new(Schema::standard().unwrap());
//! let mut session =
//!     EditorSession::from_markup(schema, "<p>Area: </p>", EditorConfig::default()).unwrap();
//! session.set_selection(Selection::cursor(7));
//!
//! for ch in ["$", "$", "r", "^", "2", "$", "$"] {
//!     commands::insert_text(&mut session, ch);
//! }
//! assert_eq!(
//!     session.to_markup(),
//!     r#"<p>Area: <inline-math data-formula="r^2"/></p>"#
//! );
//! ```

pub mod commands;
mod config;
mod context;
mod errors;
mod input_rules;
mod placeholders;
mod post_effects;
mod session;
mod undo_stack;

pub use config::EditorConfig;
pub use context::{link_at, resolve_context_menu, ContextMenu, Coords, CoordsLookup, LinkTarget};
pub use errors::EditorError;
pub use input_rules::{inline_math_rule, InputRule, InputRules, MAX_MATCH};
pub use placeholders::{
    PlaceholderError, PlaceholderId, PlaceholderResult, PlaceholderState, PlaceholderTracker,
    Resolution,
};
pub use post_effects::{
    enforce_link_color, link_color_violations, LinkColorEffect, LinkColorViolation, PostEffect,
    PostEffectEngine,
};
pub use session::EditorSession;
pub use undo_stack::{HistoryEntry, UndoStack};
