//! Field value reading
//!
//! Extracts the currently rendered value of a classified field. Readers
//! never mutate the tree and never fail: a structurally broken field simply
//! has no value.

use crate::classify::FieldKind;
use crate::format::FormatProvider;
use crate::locator::{self, Delimiters};
use doc_tree::{DocumentTree, ElementKind, FormFieldSettings, NodeId};

/// Read the rendered value of a classified field
pub fn read_value(
    tree: &DocumentTree,
    start: NodeId,
    kind: &FieldKind,
    provider: &FormatProvider,
) -> Option<String> {
    match kind {
        FieldKind::Checkbox { descriptor } => read_checkbox(tree, *descriptor, provider),
        FieldKind::Text {
            delimiters: Some(delimiters),
            ..
        } => read_delimited(tree, start, delimiters),
        FieldKind::Text {
            delimiters: None, ..
        } => read_simple(tree, start),
        FieldKind::TableColumn { column } => read_table_column(tree, start, *column),
        FieldKind::Simple => read_simple(tree, start),
    }
}

/// Render the checked state carried by a checkbox descriptor
fn read_checkbox(tree: &DocumentTree, descriptor: NodeId, provider: &FormatProvider) -> Option<String> {
    match tree.kind(descriptor)? {
        ElementKind::FormField(data) => match &data.settings {
            FormFieldSettings::Checkbox { checked } => Some(provider.format_bool(*checked)),
            FormFieldSettings::Text { .. } => None,
        },
        _ => None,
    }
}

/// The run holding the literal content between a field's delimiters, if any
///
/// The scan also stops at the bookmark's own end marker, so a malformed
/// tree with the marker inside the delimiter span never leaks text from
/// beyond it.
pub(crate) fn content_run(
    tree: &DocumentTree,
    start: NodeId,
    delimiters: &Delimiters,
) -> Option<NodeId> {
    let separate_run = tree.parent(delimiters.separate)?;
    tree.siblings_after(separate_run)
        .take_while(|&sibling| {
            !tree.is_matching_end(sibling, start) && !tree.is_after(sibling, delimiters.end)
        })
        .find(|&sibling| tree.has_text_child(sibling))
}

/// First text rendered between a scripted field's delimiters
fn read_delimited(tree: &DocumentTree, start: NodeId, delimiters: &Delimiters) -> Option<String> {
    let run = content_run(tree, start, delimiters)?;
    let text = tree.first_text_child(run)?;
    tree.text_of(text).map(str::to_string)
}

/// The text-bearing element between a plain bookmark's markers, if any
pub(crate) fn simple_content(tree: &DocumentTree, start: NodeId) -> Option<NodeId> {
    let end = locator::find_matching_end(tree, start);
    tree.siblings_after(start)
        .take_while(|&sibling| Some(sibling) != end)
        .find(|&sibling| tree.first_text_descendant(sibling).is_some())
}

/// First text between a plain bookmark's start and end markers
fn read_simple(tree: &DocumentTree, start: NodeId) -> Option<String> {
    let holder = simple_content(tree, start)?;
    let text = tree.first_text_descendant(holder)?;
    tree.text_of(text).map(str::to_string)
}

/// The table cell a column-addressed bookmark resolves to
pub(crate) fn column_cell(tree: &DocumentTree, start: NodeId, column: usize) -> Option<NodeId> {
    let row = tree.nearest_ancestor_where(start, |k| matches!(k, ElementKind::TableRow))?;
    tree.children(row)
        .iter()
        .copied()
        .filter(|&c| matches!(tree.kind(c), Some(ElementKind::TableCell)))
        .nth(column)
}

/// First text in the Nth cell of the bookmark's enclosing table row
fn read_table_column(tree: &DocumentTree, start: NodeId, column: usize) -> Option<String> {
    let cell = column_cell(tree, start, column)?;
    let text = tree.first_text_descendant(cell)?;
    tree.text_of(text).map(str::to_string)
}
