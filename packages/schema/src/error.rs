//! Error types for the node type registry

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Type already registered: {0}")]
    DuplicateType(String),

    #[error("Unknown node type: {0}")]
    UnknownType(String),

    #[error("Unknown mark type: {0}")]
    UnknownMark(String),

    #[error("Invalid spec for {type_name}: {message}")]
    InvalidSpec { type_name: String, message: String },
}

impl SchemaError {
    pub fn invalid_spec(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}
