//! Error types for the editor

use crate::mutations::MutationError;
use tessera_analyzer::StructuralParseError;
use tessera_compiler_css::StyleError;
use tessera_document::DocumentError;
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Parse error: {0}")]
    Parse(#[from] StructuralParseError),

    #[error("Style error: {0}")]
    Style(#[from] StyleError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("No block is being edited")]
    NoActiveBlock,

    #[error("Block {0} is not being edited")]
    NotEditing(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
