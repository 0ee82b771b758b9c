//! Error types for the document engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("Position {pos} out of range (document size {size})")]
    OutOfRange { pos: usize, size: usize },

    #[error("Invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("Replace range {from}..{to} spans different parents")]
    CrossParent { from: usize, to: usize },

    #[error("No element at position {0}")]
    NotAnElement(usize),

    #[error("Node at position {0} cannot hold content")]
    NotAContainer(usize),
}
