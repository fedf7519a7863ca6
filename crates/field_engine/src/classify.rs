//! Field classification
//!
//! Resolves each bookmark to exactly one field kind, once, so the reader
//! and mutator can pattern-match instead of re-inspecting descriptor
//! metadata on every call.

use crate::locator::{self, Delimiters};
use crate::{FieldError, Result};
use doc_tree::{DocumentTree, ElementKind, NodeId};
use serde::{Deserialize, Serialize};

/// The resolved kind of a bookmark-anchored field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Checkbox form field; state lives in the descriptor
    Checkbox {
        /// The owning form-field descriptor node
        descriptor: NodeId,
    },
    /// Text form field, optionally bounded by field-character delimiters
    Text {
        /// The owning form-field descriptor node
        descriptor: NodeId,
        /// Content delimiters; None makes the field behave like a simple one
        delimiters: Option<Delimiters>,
    },
    /// Value lives in the Nth cell of the bookmark's enclosing table row
    TableColumn {
        /// Zero-based cell offset within the row
        column: usize,
    },
    /// Plain bookmark; value is the first text-bearing sibling before the
    /// end marker
    Simple,
}

/// Classify a bookmark start into its field kind
///
/// Resolution order, first match wins: owned form-field descriptor
/// (checkbox before text), declared table-column offset, simple.
pub fn classify(tree: &DocumentTree, start: NodeId) -> Result<FieldKind> {
    let Some(ElementKind::BookmarkStart {
        name, column_first, ..
    }) = tree.kind(start)
    else {
        return Err(FieldError::NotABookmark(start));
    };
    let column_first = *column_first;

    let container = tree.parent(start).unwrap_or(tree.root());
    let descriptor = tree.descendants(container).find(|&id| {
        matches!(tree.kind(id), Some(ElementKind::FormField(data)) if data.matches_name(name))
    });

    if let Some(descriptor) = descriptor {
        let is_checkbox = matches!(
            tree.kind(descriptor),
            Some(ElementKind::FormField(data)) if data.is_checkbox()
        );
        if is_checkbox {
            return Ok(FieldKind::Checkbox { descriptor });
        }
        return Ok(FieldKind::Text {
            descriptor,
            delimiters: locator::delimiters(tree, start),
        });
    }

    if let Some(column) = column_first {
        return Ok(FieldKind::TableColumn { column });
    }

    Ok(FieldKind::Simple)
}
