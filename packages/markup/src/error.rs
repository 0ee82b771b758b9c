//! Error types for markup loading

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    #[error("Malformed markup at byte {position}: {message}")]
    Malformed { position: usize, message: String },

    #[error("Closing tag </{0}> has no matching opening tag")]
    UnexpectedClose(String),
}
