//! Node ID - arena index for tree elements

use serde::{Deserialize, Serialize};

/// Identifier for an element in the document tree.
///
/// An index into the tree's arena. Ids are stable for the lifetime of the
/// tree: removal detaches an element from its parent but never reuses the
/// slot, so a held id can never silently point at a different element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a NodeId from a raw arena index
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Get the raw arena index
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
