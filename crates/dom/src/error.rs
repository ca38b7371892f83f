//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. Only unparseable input is fatal; a lookup
//! that misses is never an error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Parse error: no content to parse")]
    EmptyDocument,

    #[error("Parse error: markup has no root element")]
    NoRootElement,

    #[error("Parse error: fragment must have exactly one root element, found {0}")]
    MultipleRoots(usize),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DomError {
    /// True for the failures that mean the markup could not become a tree.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            DomError::EmptyDocument | DomError::NoRootElement | DomError::MultipleRoots(_)
        )
    }
}
