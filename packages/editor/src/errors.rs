//! Error types for the editor

use crate::placeholders::PlaceholderError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Schema error: {0}")]
    Schema(#[from] postcraft_schema::SchemaError),

    #[error("Step error: {0}")]
    Step(#[from] postcraft_model::StepError),

    #[error("Markup error: {0}")]
    Markup(#[from] postcraft_markup::MarkupError),

    #[error("Placeholder error: {0}")]
    Placeholder(#[from] PlaceholderError),

    #[error("Transaction was built against a different document")]
    StaleTransaction,
}
