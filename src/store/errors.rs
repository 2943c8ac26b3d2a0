//! # Store Errors

use thiserror::Error;

use super::entry::NodeId;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Node store errors
#[derive(Debug, Error)]
pub enum StoreError {
    // Document errors
    #[error("Document not found: {0}")]
    NotFound(String),

    // Node errors
    #[error("Node not found: {doc}/{id}")]
    NodeNotFound { doc: String, id: NodeId },

    // Reorder errors
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    // Validation errors
    #[error("Invalid name: {0}")]
    InvalidName(String),

    // I/O errors
    #[error("Storage I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Wrap an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => 404,
            StoreError::NodeNotFound { .. } => 404,
            StoreError::InvalidOrder(_) => 400,
            StoreError::InvalidName(_) => 400,
            StoreError::Io { .. } => 500,
        }
    }
}
