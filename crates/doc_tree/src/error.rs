//! Error types for document tree operations

use crate::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocTreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, DocTreeError>;
