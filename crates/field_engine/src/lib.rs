//! Bookmark-anchored form-field resolution and mutation
//!
//! Bookmarks in a [`doc_tree::DocumentTree`] anchor fillable fields:
//! checkbox and text form fields, table-column slots, and plain bookmark
//! spans. This crate classifies each bookmark into a [`FieldKind`], reads
//! the rendered value, and writes new values while preserving markers,
//! field characters, and run formatting.
//!
//! The usual entry point is [`FieldEngine`]:
//!
//! ```
//! use doc_tree::{DocumentTree, ElementKind};
//! use field_engine::FieldEngine;
//!
//! let mut tree = DocumentTree::new();
//! let para = tree.add_paragraph();
//! tree.append_child(para, ElementKind::BookmarkStart {
//!     id: 1,
//!     name: "City".into(),
//!     column_first: None,
//! }).unwrap();
//! tree.append_child(para, ElementKind::BookmarkEnd { id: 1 }).unwrap();
//!
//! let engine = FieldEngine::new();
//! engine.write_by_name(&mut tree, "City", Some("Lisbon")).unwrap();
//! assert_eq!(engine.read_by_name(&tree, "City").unwrap().as_deref(), Some("Lisbon"));
//! ```

pub mod classify;
pub mod engine;
pub mod error;
pub mod format;
pub mod locator;
pub mod mutator;
pub mod reader;

pub use classify::{classify, FieldKind};
pub use engine::FieldEngine;
pub use error::{FieldError, Result};
pub use format::FormatProvider;
pub use locator::Delimiters;
pub use mutator::write_value;
pub use reader::read_value;
