//! Document Tree - flow-content tree structure for form-field documents
//!
//! This crate provides the in-memory document model the bookmark field
//! engine operates on: paragraphs, runs, text leaves, paired bookmark
//! markers, field-character control nodes, and form-field descriptors,
//! stored in an arena with index-based child lists.

mod element;
mod error;
mod form_field;
mod node_id;
mod tree;

pub use element::*;
pub use error::*;
pub use form_field::*;
pub use node_id::*;
pub use tree::*;
