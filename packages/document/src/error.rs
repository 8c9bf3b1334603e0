//! Error types for the document model

use thiserror::Error;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Index {index} out of range for document with {len} blocks")]
    Index { index: usize, len: usize },

    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("Moving {element_id} into {new_parent_id} would create a cycle")]
    Cycle {
        element_id: String,
        new_parent_id: String,
    },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Element {0} cannot contain children")]
    InvalidParent(String),

    #[error("The root element {0} cannot be moved or removed")]
    RootElement(String),

    #[error("Element {0} is locked")]
    ElementLocked(String),

    #[error("Class '{0}' is a system class and cannot be removed")]
    SystemClass(String),

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DocumentError {
    pub fn index(index: usize, len: usize) -> Self {
        Self::Index { index, len }
    }

    pub fn cycle(element_id: impl Into<String>, new_parent_id: impl Into<String>) -> Self {
        Self::Cycle {
            element_id: element_id.into(),
            new_parent_id: new_parent_id.into(),
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        DocumentError::Serialization(e.to_string())
    }
}
