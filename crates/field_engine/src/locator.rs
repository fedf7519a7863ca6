//! Bookmark location
//!
//! Finds bookmark-start markers, their paired end markers, and the
//! field-character delimiters that bound a scripted form field's rendered
//! content. Delimiter scans stay inside the bookmark's enclosing container
//! so they never cross into an unrelated field sharing the paragraph tree.

use doc_tree::{DocumentTree, ElementKind, FieldCharKind, NodeId};
use serde::{Deserialize, Serialize};

/// Reserved prefix marking a bookmark as hidden
const HIDDEN_PREFIX: char = '_';

/// The field-character pair bounding a scripted field's rendered content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    /// The `Separate` field char; literal content starts after it
    pub separate: NodeId,
    /// The `End` field char terminating the content
    pub end: NodeId,
}

/// All bookmark-start markers in the document, in document order
pub fn all_bookmarks(tree: &DocumentTree) -> Vec<NodeId> {
    tree.descendants(tree.root())
        .filter(|&id| matches!(tree.kind(id), Some(ElementKind::BookmarkStart { .. })))
        .collect()
}

/// The name carried by a bookmark-start marker
pub fn bookmark_name(tree: &DocumentTree, start: NodeId) -> Option<&str> {
    tree.kind(start).and_then(|k| k.bookmark_name())
}

/// True iff the name marks a hidden bookmark (reserved `_` prefix)
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_PREFIX)
}

/// The bookmark-end marker pairing with `start`, scanning the enclosing
/// container first and the whole document as a fallback
pub fn find_matching_end(tree: &DocumentTree, start: NodeId) -> Option<NodeId> {
    let container = tree.parent(start).unwrap_or(tree.root());
    tree.descendants(container)
        .find(|&id| tree.is_matching_end(id, start))
        .or_else(|| {
            tree.descendants(tree.root())
                .find(|&id| tree.is_matching_end(id, start))
        })
}

/// The `Separate`/`End` field-character pair for a scripted form field
///
/// Returns None for simple bookmarks that carry no field characters.
pub fn delimiters(tree: &DocumentTree, start: NodeId) -> Option<Delimiters> {
    let container = tree.parent(start)?;
    let separate = tree.descendants(container).find(|&id| {
        matches!(
            tree.kind(id),
            Some(ElementKind::FieldChar(FieldCharKind::Separate))
        ) && tree.is_after(id, start)
    })?;
    let end = tree.descendants(container).find(|&id| {
        matches!(
            tree.kind(id),
            Some(ElementKind::FieldChar(FieldCharKind::End))
        ) && tree.is_after(id, separate)
    })?;
    Some(Delimiters { separate, end })
}
