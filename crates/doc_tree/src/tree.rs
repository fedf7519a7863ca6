//! Document tree storage and navigation
//!
//! Elements live in an arena indexed by [`NodeId`]; parent/child links are
//! index-based, so structural edits never invalidate unrelated handles.
//! Document order is derived from root paths, which turns "is this node
//! after that one" into a component-wise index comparison.

use crate::{DocTreeError, Element, ElementKind, NodeId, Result, RunProperties};
use serde::{Deserialize, Serialize};

/// The complete document tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    arena: Vec<Element>,
    root: NodeId,
}

impl DocumentTree {
    /// Create a new tree containing only the body root
    pub fn new() -> Self {
        let root = Element::new(ElementKind::Body);
        Self {
            arena: vec![root],
            root: NodeId::from_index(0),
        }
    }

    /// Get the body root id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get an element by id
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.arena.get(id.index())
    }

    /// Get a mutable element by id
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.arena.get_mut(id.index())
    }

    /// Get an element's kind
    pub fn kind(&self, id: NodeId) -> Option<&ElementKind> {
        self.get(id).map(|el| &el.kind)
    }

    /// Get an element's parent id
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|el| el.parent)
    }

    /// Get an element's ordered child ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|el| el.children.as_slice()).unwrap_or(&[])
    }

    /// Allocate a detached element, returning its id
    pub fn push(&mut self, kind: ElementKind) -> NodeId {
        let id = NodeId::from_index(self.arena.len());
        self.arena.push(Element::new(kind));
        id
    }

    /// Allocate an element and append it as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, kind: ElementKind) -> Result<NodeId> {
        let id = self.push(kind);
        self.attach(id, parent, None)?;
        Ok(id)
    }

    /// Insert an already-allocated element as a sibling directly before
    /// `reference`
    pub fn insert_before(&mut self, id: NodeId, reference: NodeId) -> Result<()> {
        let parent = self
            .parent(reference)
            .ok_or(DocTreeError::NodeNotFound(reference))?;
        let index = self.children(parent)
            .iter()
            .position(|&c| c == reference)
            .ok_or(DocTreeError::NodeNotFound(reference))?;
        self.attach(id, parent, Some(index))
    }

    fn attach(&mut self, id: NodeId, parent: NodeId, index: Option<usize>) -> Result<()> {
        if self.get(id).is_none() {
            return Err(DocTreeError::NodeNotFound(id));
        }
        let parent_el = self
            .get(parent)
            .ok_or(DocTreeError::NodeNotFound(parent))?;
        if !parent_el.kind.can_have_children() {
            return Err(DocTreeError::InvalidOperation(format!(
                "element {} cannot have children",
                parent
            )));
        }
        match index {
            Some(i) => self.arena[parent.index()].children.insert(i, id),
            None => self.arena[parent.index()].children.push(id),
        }
        self.arena[id.index()].parent = Some(parent);
        Ok(())
    }

    /// Detach an element (and its subtree) from its parent
    ///
    /// The slot stays allocated so unrelated ids remain valid; the subtree
    /// simply becomes unreachable from the root.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let parent = self.parent(id).ok_or(DocTreeError::NodeNotFound(id))?;
        self.arena[parent.index()].children.retain(|&c| c != id);
        self.arena[id.index()].parent = None;
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Get the sibling directly after `id`, if any
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Iterate the siblings strictly after `id`, in order
    pub fn siblings_after(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = Some(id);
        std::iter::from_fn(move || {
            current = self.next_sibling(current?);
            current
        })
    }

    /// Iterate descendants of `id` in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// First descendant matching a predicate, in document order
    pub fn first_descendant_where<F>(&self, id: NodeId, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&ElementKind) -> bool,
    {
        self.descendants(id)
            .find(|&d| self.kind(d).is_some_and(|k| pred(k)))
    }

    /// Iterate ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.parent(id);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.parent(next);
            Some(next)
        })
    }

    /// Nearest ancestor matching a predicate, or None when the chain is
    /// exhausted
    pub fn nearest_ancestor_where<F>(&self, id: NodeId, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&ElementKind) -> bool,
    {
        self.ancestors(id)
            .find(|&a| self.kind(a).is_some_and(|k| pred(k)))
    }

    /// Child-index path from the root down to `id`
    ///
    /// Returns None for detached elements and unknown ids.
    pub fn path_from_root(&self, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            let parent = self.parent(current)?;
            let index = self.children(parent).iter().position(|&c| c == current)?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// True iff `a` occurs strictly after `b` in document order
    ///
    /// A descendant counts as after its ancestor. Detached elements compare
    /// as not-after everything.
    pub fn is_after(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let (Some(path_a), Some(path_b)) = (self.path_from_root(a), self.path_from_root(b))
        else {
            return false;
        };
        for (ia, ib) in path_a.iter().zip(path_b.iter()) {
            if ia != ib {
                return ia > ib;
            }
        }
        path_a.len() > path_b.len()
    }

    /// True iff `node` is a bookmark-end marker pairing with `start`
    pub fn is_matching_end(&self, node: NodeId, start: NodeId) -> bool {
        let Some(ElementKind::BookmarkStart { id: start_id, .. }) = self.kind(start) else {
            return false;
        };
        matches!(self.kind(node), Some(ElementKind::BookmarkEnd { id }) if id == start_id)
    }

    // =========================================================================
    // Text access
    // =========================================================================

    /// Get the text of a text leaf
    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            ElementKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// First text leaf among the descendants of `id`, in document order
    pub fn first_text_descendant(&self, id: NodeId) -> Option<NodeId> {
        self.first_descendant_where(id, |k| matches!(k, ElementKind::Text(_)))
    }

    /// True iff `id` has a direct text-leaf child
    pub fn has_text_child(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .any(|&c| matches!(self.kind(c), Some(ElementKind::Text(_))))
    }

    /// First direct text-leaf child of `id`
    pub fn first_text_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| matches!(self.kind(c), Some(ElementKind::Text(_))))
    }

    /// Cloned run properties of a run element, if it carries any
    pub fn run_properties(&self, id: NodeId) -> Option<RunProperties> {
        match self.kind(id)? {
            ElementKind::Run { properties } => properties.clone(),
            _ => None,
        }
    }

    // =========================================================================
    // Construction helpers
    // =========================================================================

    /// Append a paragraph to the body
    pub fn add_paragraph(&mut self) -> NodeId {
        // The root always accepts children, so this cannot fail
        self.append_child(self.root, ElementKind::Paragraph)
            .unwrap_or(self.root)
    }

    /// Append a run with optional formatting and a text leaf to `parent`
    pub fn add_text_run(
        &mut self,
        parent: NodeId,
        properties: Option<RunProperties>,
        text: impl Into<String>,
    ) -> Result<NodeId> {
        let run = self.append_child(parent, ElementKind::Run { properties })?;
        self.append_child(run, ElementKind::Text(text.into()))?;
        Ok(run)
    }

    /// Append an empty run with optional formatting to `parent`
    pub fn add_run(
        &mut self,
        parent: NodeId,
        properties: Option<RunProperties>,
    ) -> Result<NodeId> {
        self.append_child(parent, ElementKind::Run { properties })
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Document-order (pre-order) descendant iterator
pub struct Descendants<'a> {
    tree: &'a DocumentTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        for &child in self.tree.children(next).iter().rev() {
            self.stack.push(child);
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldCharKind;

    fn sample_tree() -> (DocumentTree, NodeId, NodeId, NodeId) {
        let mut tree = DocumentTree::new();
        let para = tree.add_paragraph();
        let run_a = tree.add_text_run(para, None, "alpha").unwrap();
        let run_b = tree.add_text_run(para, None, "beta").unwrap();
        (tree, para, run_a, run_b)
    }

    #[test]
    fn test_append_and_children_order() {
        let (tree, para, run_a, run_b) = sample_tree();
        assert_eq!(tree.children(para), &[run_a, run_b]);
        assert_eq!(tree.parent(run_a), Some(para));
        assert_eq!(tree.next_sibling(run_a), Some(run_b));
        assert_eq!(tree.next_sibling(run_b), None);
    }

    #[test]
    fn test_descendants_document_order() {
        let (tree, para, run_a, run_b) = sample_tree();
        let order: Vec<NodeId> = tree.descendants(tree.root()).collect();
        let text_a = tree.first_text_child(run_a).unwrap();
        let text_b = tree.first_text_child(run_b).unwrap();
        assert_eq!(order, vec![para, run_a, text_a, run_b, text_b]);
    }

    #[test]
    fn test_is_after() {
        let (tree, para, run_a, run_b) = sample_tree();
        assert!(tree.is_after(run_b, run_a));
        assert!(!tree.is_after(run_a, run_b));
        assert!(!tree.is_after(run_a, run_a));
        // A descendant is after its ancestor
        assert!(tree.is_after(run_a, para));
        let text_a = tree.first_text_child(run_a).unwrap();
        assert!(tree.is_after(run_b, text_a));
    }

    #[test]
    fn test_detach_keeps_other_ids_valid() {
        let (mut tree, para, run_a, run_b) = sample_tree();
        tree.detach(run_a).unwrap();
        assert_eq!(tree.children(para), &[run_b]);
        assert_eq!(tree.parent(run_a), None);
        assert_eq!(tree.text_of(tree.first_text_child(run_b).unwrap()), Some("beta"));
        // Detached elements are not in document order
        assert!(!tree.is_after(run_a, para));
    }

    #[test]
    fn test_insert_before() {
        let (mut tree, para, run_a, _run_b) = sample_tree();
        let run_c = tree.push(ElementKind::Run { properties: None });
        tree.insert_before(run_c, run_a).unwrap();
        assert_eq!(tree.children(para)[0], run_c);
    }

    #[test]
    fn test_leaves_reject_children() {
        let (mut tree, _para, run_a, _run_b) = sample_tree();
        let text = tree.first_text_child(run_a).unwrap();
        let result = tree.append_child(text, ElementKind::Paragraph);
        assert!(matches!(result, Err(DocTreeError::InvalidOperation(_))));
    }

    #[test]
    fn test_matching_end_marker() {
        let mut tree = DocumentTree::new();
        let para = tree.add_paragraph();
        let start = tree
            .append_child(
                para,
                ElementKind::BookmarkStart {
                    id: 7,
                    name: "Here".into(),
                    column_first: None,
                },
            )
            .unwrap();
        let end = tree
            .append_child(para, ElementKind::BookmarkEnd { id: 7 })
            .unwrap();
        let other = tree
            .append_child(para, ElementKind::BookmarkEnd { id: 8 })
            .unwrap();
        assert!(tree.is_matching_end(end, start));
        assert!(!tree.is_matching_end(other, start));
        assert!(!tree.is_matching_end(start, start));
    }

    #[test]
    fn test_nearest_ancestor() {
        let mut tree = DocumentTree::new();
        let table = tree.append_child(tree.root(), ElementKind::Table).unwrap();
        let row = tree.append_child(table, ElementKind::TableRow).unwrap();
        let cell = tree.append_child(row, ElementKind::TableCell).unwrap();
        let para = tree.append_child(cell, ElementKind::Paragraph).unwrap();
        let found = tree.nearest_ancestor_where(para, |k| matches!(k, ElementKind::TableRow));
        assert_eq!(found, Some(row));
        let none = tree.nearest_ancestor_where(table, |k| matches!(k, ElementKind::TableRow));
        assert_eq!(none, None);
    }

    #[test]
    fn test_siblings_after_stops_at_end() {
        let mut tree = DocumentTree::new();
        let para = tree.add_paragraph();
        let a = tree.add_run(para, None).unwrap();
        let b = tree
            .append_child(para, ElementKind::FieldChar(FieldCharKind::Separate))
            .unwrap();
        let c = tree.add_run(para, None).unwrap();
        let after: Vec<NodeId> = tree.siblings_after(a).collect();
        assert_eq!(after, vec![b, c]);
    }

    #[test]
    fn test_serde_round_trip() {
        let (tree, _para, run_a, _run_b) = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let restored: DocumentTree = serde_json::from_str(&json).unwrap();
        let text = restored.first_text_child(run_a).unwrap();
        assert_eq!(restored.text_of(text), Some("alpha"));
    }
}
