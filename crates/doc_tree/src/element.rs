//! Element kinds and run formatting

use crate::FormFieldData;
use serde::{Deserialize, Serialize};

/// The role a field-character control node plays in a scripted form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldCharKind {
    /// Opens the field; the descriptor block lives under this run
    Begin,
    /// Boundary after which literal rendered content starts
    Separate,
    /// Terminates the field's rendered content
    End,
}

/// Character formatting carried by a run
///
/// All properties are optional; `None` means "inherit". Cloned wholesale
/// when the mutator preserves formatting across a content rewrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    /// Font family name
    pub font_family: Option<String>,
    /// Font size in points
    pub font_size: Option<f32>,
    /// Bold formatting
    pub bold: Option<bool>,
    /// Italic formatting
    pub italic: Option<bool>,
    /// Underline formatting
    pub underline: Option<bool>,
    /// Text color (CSS color string)
    pub color: Option<String>,
}

impl RunProperties {
    /// Create new empty run properties
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no property is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What a tree element is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    /// Document body, the tree root
    Body,
    /// Block of flow content containing runs and markers
    Paragraph,
    /// Formatting-scoped content unit; holds at most one text leaf
    Run {
        properties: Option<RunProperties>,
    },
    /// Text leaf, child of a run
    Text(String),
    /// Opening half of a paired bookmark marker
    BookmarkStart {
        id: u32,
        name: String,
        /// Column offset for table-column bookmarks
        column_first: Option<usize>,
    },
    /// Closing half of a paired bookmark marker
    BookmarkEnd { id: u32 },
    /// Field-character control node
    FieldChar(FieldCharKind),
    /// Form-field descriptor block
    FormField(FormFieldData),
    /// Table container
    Table,
    /// Row within a table
    TableRow,
    /// Cell within a table row
    TableCell,
}

impl ElementKind {
    /// Check if this kind can have children
    pub fn can_have_children(&self) -> bool {
        !matches!(
            self,
            ElementKind::Text(_)
                | ElementKind::BookmarkStart { .. }
                | ElementKind::BookmarkEnd { .. }
                | ElementKind::FieldChar(_)
                | ElementKind::FormField(_)
        )
    }

    /// Get the bookmark name if this is a bookmark start
    pub fn bookmark_name(&self) -> Option<&str> {
        match self {
            ElementKind::BookmarkStart { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// An element in the document tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// What this element is
    pub kind: ElementKind,
    /// Parent element (None for the root and detached elements)
    pub parent: Option<crate::NodeId>,
    /// Ordered child element ids
    pub children: Vec<crate::NodeId>,
}

impl Element {
    /// Create a detached element of the given kind
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}
