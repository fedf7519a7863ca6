//! Error types for field engine operations

use doc_tree::{DocTreeError, NodeId};
use thiserror::Error;

/// Errors that can occur while resolving or mutating form fields
#[derive(Debug, Error)]
pub enum FieldError {
    /// The supplied node is not a bookmark-start marker
    #[error("Element {0} is not a bookmark start")]
    NotABookmark(NodeId),

    /// A date field was given text that does not parse as a date
    #[error("Not a valid date string: {0:?}")]
    InvalidDate(String),

    /// A checkbox field was given text that is neither a boolean nor a number
    #[error("Not a valid boolean value: {0:?}")]
    InvalidBoolean(String),

    /// Underlying tree operation failed
    #[error(transparent)]
    Tree(#[from] DocTreeError),
}

/// Result type for field engine operations
pub type Result<T> = std::result::Result<T, FieldError>;
