//! Field value writing
//!
//! Applies a new value to a classified field while preserving the
//! surrounding structure: bookmark markers, field characters, and the
//! formatting of the run that previously held the value all survive the
//! write. Structurally broken anchors are logged and skipped rather than
//! failed, so one damaged field never aborts a batch.

use crate::classify::FieldKind;
use crate::format::FormatProvider;
use crate::locator::{self, Delimiters};
use crate::reader;
use crate::Result;
use doc_tree::{
    DocumentTree, ElementKind, FormFieldSettings, NodeId, RunProperties, TextInputType,
};
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

/// Write a value into a classified field
///
/// `None` clears text fields (falling back to the descriptor default when
/// one is declared) and unchecks checkboxes.
pub fn write_value(
    tree: &mut DocumentTree,
    start: NodeId,
    kind: &FieldKind,
    value: Option<&str>,
    provider: &FormatProvider,
) -> Result<()> {
    match kind {
        FieldKind::Checkbox { descriptor } => {
            write_checkbox(tree, *descriptor, value, provider)
        }
        FieldKind::Text {
            descriptor,
            delimiters,
        } => {
            let normalized = normalize_text_value(tree, *descriptor, value, provider)?;
            match delimiters {
                Some(delimiters) => {
                    write_delimited(tree, start, *delimiters, &normalized);
                    Ok(())
                }
                None => {
                    write_simple(tree, start, &normalized);
                    Ok(())
                }
            }
        }
        FieldKind::TableColumn { column } => {
            write_table_column(tree, start, *column, value.unwrap_or(""));
            Ok(())
        }
        FieldKind::Simple => {
            write_simple(tree, start, value.unwrap_or(""));
            Ok(())
        }
    }
}

/// Set a checkbox descriptor's state
///
/// A missing value unchecks the box; anything else must parse as a boolean.
fn write_checkbox(
    tree: &mut DocumentTree,
    descriptor: NodeId,
    value: Option<&str>,
    provider: &FormatProvider,
) -> Result<()> {
    let checked = match value {
        Some(raw) => provider.parse_bool(raw)?,
        None => false,
    };
    if let Some(element) = tree.get_mut(descriptor) {
        if let ElementKind::FormField(data) = &mut element.kind {
            if let FormFieldSettings::Checkbox { checked: state } = &mut data.settings {
                *state = checked;
                return Ok(());
            }
        }
    }
    warn!(%descriptor, "Checkbox descriptor missing, skipping write");
    Ok(())
}

/// Apply a text descriptor's constraints to an incoming value
///
/// A missing value falls back to the declared default; supplied values are
/// kept verbatim, whitespace included. Date fields re-render non-blank
/// input through the declared output format. The maximum length is a hard
/// cut counted in grapheme clusters.
fn normalize_text_value(
    tree: &DocumentTree,
    descriptor: NodeId,
    value: Option<&str>,
    provider: &FormatProvider,
) -> Result<String> {
    let Some(ElementKind::FormField(data)) = tree.kind(descriptor) else {
        return Ok(value.unwrap_or("").to_string());
    };
    let FormFieldSettings::Text {
        default,
        max_length,
        input_type,
        format,
    } = &data.settings
    else {
        return Ok(value.unwrap_or("").to_string());
    };

    let mut text = match value {
        Some(raw) => raw.to_string(),
        None => default.clone().unwrap_or_default(),
    };

    if *input_type == TextInputType::Date && !text.trim().is_empty() {
        if let Some(format) = format {
            let date = provider.parse_date(&text)?;
            text = provider.format_date(date, format);
        }
    }

    if let Some(max) = *max_length {
        text = text.graphemes(true).take(max).collect();
    }

    Ok(text)
}

/// Replace the content between a scripted field's delimiters
///
/// All text-bearing runs between the delimiters are removed; a single run
/// carrying the new value takes the place of the first, inheriting its
/// formatting. The removal scan stops at the bookmark's own end marker,
/// matching the read side.
fn write_delimited(tree: &mut DocumentTree, start: NodeId, delimiters: Delimiters, value: &str) {
    let Some(separate_run) = tree.parent(delimiters.separate) else {
        warn!("Field separator is detached, skipping write");
        return;
    };
    let Some(end_run) = tree.parent(delimiters.end) else {
        warn!("Field terminator is detached, skipping write");
        return;
    };

    let old_runs: Vec<NodeId> = tree
        .siblings_after(separate_run)
        .take_while(|&sibling| {
            !tree.is_matching_end(sibling, start)
                && !tree.is_after(sibling, delimiters.end)
                && sibling != end_run
        })
        .filter(|&sibling| tree.has_text_child(sibling))
        .collect();
    let properties = old_runs
        .first()
        .and_then(|&run| tree.run_properties(run));

    let run = tree.push(ElementKind::Run { properties });
    if tree.append_child(run, ElementKind::Text(value.to_string())).is_err()
        || tree.insert_before(run, end_run).is_err()
    {
        warn!("Field content slot is unreachable, skipping write");
        return;
    }
    for old in old_runs {
        let _ = tree.detach(old);
    }
}

/// Replace the content between a plain bookmark's markers
///
/// Overwrites the first text found in place and removes any further text
/// between the markers. A bookmark with no text gets a fresh run, taking
/// its formatting from the nearest following run.
fn write_simple(tree: &mut DocumentTree, start: NodeId, value: &str) {
    let Some(end) = locator::find_matching_end(tree, start) else {
        warn!(%start, "Bookmark has no end marker, skipping write");
        return;
    };

    if let Some(holder) = reader::simple_content(tree, start) {
        overwrite_first_text(tree, holder, value);
        remove_other_texts(tree, holder, end);
        return;
    }

    // Borrow formatting from whatever run follows the start marker
    let properties = tree
        .siblings_after(start)
        .find_map(|sibling| tree.run_properties(sibling));
    insert_run_before(tree, end, start, properties, value);
}

/// Write into the Nth cell of the bookmark's enclosing row
fn write_table_column(tree: &mut DocumentTree, start: NodeId, column: usize, value: &str) {
    let Some(cell) = reader::column_cell(tree, start, column) else {
        warn!(%start, column, "Row has no such cell, skipping write");
        return;
    };
    if tree.first_text_descendant(cell).is_some() {
        overwrite_first_text(tree, cell, value);
        return;
    }
    // An empty cell gets a run appended to its last paragraph
    let paragraph = tree
        .children(cell)
        .iter()
        .copied()
        .filter(|&c| matches!(tree.kind(c), Some(ElementKind::Paragraph)))
        .last();
    let Some(paragraph) = paragraph else {
        warn!(column, "Cell has no paragraph, skipping write");
        return;
    };
    let _ = tree.add_text_run(paragraph, None, value);
}

/// Overwrite the first text descendant of `scope` in place
fn overwrite_first_text(tree: &mut DocumentTree, scope: NodeId, value: &str) {
    let target = if tree.text_of(scope).is_some() {
        Some(scope)
    } else {
        tree.first_text_descendant(scope)
    };
    let Some(target) = target else {
        return;
    };
    if let Some(element) = tree.get_mut(target) {
        element.kind = ElementKind::Text(value.to_string());
    }
}

/// Remove every text element between `holder` and the end marker, keeping
/// the first text inside `holder` itself
fn remove_other_texts(tree: &mut DocumentTree, holder: NodeId, end: NodeId) {
    let kept = tree.first_text_descendant(holder).or(Some(holder));
    let extra_in_holder: Vec<NodeId> = tree
        .descendants(holder)
        .filter(|&d| tree.text_of(d).is_some() && Some(d) != kept)
        .collect();
    let extra_after: Vec<NodeId> = tree
        .siblings_after(holder)
        .take_while(|&sibling| sibling != end)
        .filter(|&sibling| tree.first_text_descendant(sibling).is_some() || tree.text_of(sibling).is_some())
        .collect();
    for id in extra_in_holder.into_iter().chain(extra_after) {
        let _ = tree.detach(id);
    }
}

/// Allocate a fresh text run and place it directly before `end`
fn insert_run_before(
    tree: &mut DocumentTree,
    end: NodeId,
    start: NodeId,
    properties: Option<RunProperties>,
    value: &str,
) {
    let run = tree.push(ElementKind::Run { properties });
    if tree.append_child(run, ElementKind::Text(value.to_string())).is_err()
        || tree.insert_before(run, end).is_err()
    {
        warn!(%start, "Bookmark end marker is unreachable, skipping write");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{self, FieldKind};
    use crate::reader::read_value;
    use doc_tree::{FieldCharKind, FormFieldData};
    use proptest::prelude::*;

    fn scripted_field(
        tree: &mut DocumentTree,
        descriptor: FormFieldData,
        content: Option<(&str, Option<RunProperties>)>,
    ) -> NodeId {
        let name = descriptor.name.clone();
        let para = tree.add_paragraph();
        let start = tree
            .append_child(
                para,
                ElementKind::BookmarkStart {
                    id: 1,
                    name,
                    column_first: None,
                },
            )
            .unwrap();
        let begin_run = tree.add_run(para, None).unwrap();
        tree.append_child(begin_run, ElementKind::FieldChar(FieldCharKind::Begin))
            .unwrap();
        tree.append_child(begin_run, ElementKind::FormField(descriptor))
            .unwrap();
        let sep_run = tree.add_run(para, None).unwrap();
        tree.append_child(sep_run, ElementKind::FieldChar(FieldCharKind::Separate))
            .unwrap();
        if let Some((text, properties)) = content {
            tree.add_text_run(para, properties, text).unwrap();
        }
        let end_run = tree.add_run(para, None).unwrap();
        tree.append_child(end_run, ElementKind::FieldChar(FieldCharKind::End))
            .unwrap();
        tree.append_child(para, ElementKind::BookmarkEnd { id: 1 })
            .unwrap();
        start
    }

    fn bold() -> RunProperties {
        let mut props = RunProperties::new();
        props.bold = Some(true);
        props
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let mut tree = DocumentTree::new();
        let start = scripted_field(&mut tree, FormFieldData::text("Name"), Some(("old", None)));
        let kind = classify::classify(&tree, start).unwrap();
        let provider = FormatProvider::new();

        write_value(&mut tree, start, &kind, Some("Alice"), &provider).unwrap();
        let value = read_value(&tree, start, &kind, &provider);
        assert_eq!(value.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_write_preserves_formatting() {
        let mut tree = DocumentTree::new();
        let start = scripted_field(
            &mut tree,
            FormFieldData::text("Name"),
            Some(("old", Some(bold()))),
        );
        let kind = classify::classify(&tree, start).unwrap();
        let provider = FormatProvider::new();
        write_value(&mut tree, start, &kind, Some("new"), &provider).unwrap();

        let FieldKind::Text {
            delimiters: Some(delimiters),
            ..
        } = kind
        else {
            panic!("Expected delimited text field");
        };
        let run = reader::content_run(&tree, start, &delimiters).unwrap();
        assert_eq!(tree.run_properties(run), Some(bold()));
    }

    #[test]
    fn test_missing_value_uses_default() {
        let mut tree = DocumentTree::new();
        let descriptor = FormFieldData::text("Name").with_default("Anonymous");
        let start = scripted_field(&mut tree, descriptor, Some(("old", None)));
        let kind = classify::classify(&tree, start).unwrap();
        let provider = FormatProvider::new();

        write_value(&mut tree, start, &kind, None, &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("Anonymous")
        );
    }

    #[test]
    fn test_supplied_whitespace_round_trips() {
        let mut tree = DocumentTree::new();
        let descriptor = FormFieldData::text("Name").with_default("Anonymous");
        let start = scripted_field(&mut tree, descriptor, Some(("old", None)));
        let kind = classify::classify(&tree, start).unwrap();
        let provider = FormatProvider::new();

        // An explicit value is stored verbatim, it never falls back to the
        // default
        write_value(&mut tree, start, &kind, Some("   "), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("   ")
        );

        write_value(&mut tree, start, &kind, Some(""), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_date_field_rerenders_input() {
        let mut tree = DocumentTree::new();
        let descriptor = FormFieldData::date("Issued", "d MMMM yyyy");
        let start = scripted_field(&mut tree, descriptor, Some(("", None)));
        let kind = classify::classify(&tree, start).unwrap();
        let provider = FormatProvider::new();

        write_value(&mut tree, start, &kind, Some("2024-01-05"), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("5 January 2024")
        );
    }

    #[test]
    fn test_date_field_rejects_garbage() {
        let mut tree = DocumentTree::new();
        let descriptor = FormFieldData::date("Issued", "yyyy");
        let start = scripted_field(&mut tree, descriptor, None);
        let kind = classify::classify(&tree, start).unwrap();
        let provider = FormatProvider::new();

        let err = write_value(&mut tree, start, &kind, Some("not a date"), &provider);
        assert!(matches!(err, Err(crate::FieldError::InvalidDate(_))));
    }

    #[test]
    fn test_max_length_hard_cut() {
        let mut tree = DocumentTree::new();
        let descriptor = FormFieldData::text("Code").with_max_length(3);
        let start = scripted_field(&mut tree, descriptor, Some(("", None)));
        let kind = classify::classify(&tree, start).unwrap();
        let provider = FormatProvider::new();

        write_value(&mut tree, start, &kind, Some("abcdef"), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_max_length_counts_graphemes() {
        let mut tree = DocumentTree::new();
        let descriptor = FormFieldData::text("Code").with_max_length(2);
        let start = scripted_field(&mut tree, descriptor, Some(("", None)));
        let kind = classify::classify(&tree, start).unwrap();
        let provider = FormatProvider::new();

        write_value(&mut tree, start, &kind, Some("é👍x"), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("é👍")
        );
    }

    #[test]
    fn test_checkbox_write_variants() {
        let mut tree = DocumentTree::new();
        let para = tree.add_paragraph();
        let start = tree
            .append_child(
                para,
                ElementKind::BookmarkStart {
                    id: 1,
                    name: "Agreed".into(),
                    column_first: None,
                },
            )
            .unwrap();
        let run = tree.add_run(para, None).unwrap();
        tree.append_child(
            run,
            ElementKind::FormField(FormFieldData::checkbox("Agreed", false)),
        )
        .unwrap();
        tree.append_child(para, ElementKind::BookmarkEnd { id: 1 })
            .unwrap();

        let kind = classify::classify(&tree, start).unwrap();
        let provider = FormatProvider::new();

        write_value(&mut tree, start, &kind, Some("true"), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("True")
        );

        write_value(&mut tree, start, &kind, Some("0"), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("False")
        );

        write_value(&mut tree, start, &kind, None, &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("False")
        );

        let err = write_value(&mut tree, start, &kind, Some("maybe"), &provider);
        assert!(matches!(err, Err(crate::FieldError::InvalidBoolean(_))));
    }

    #[test]
    fn test_simple_write_inserts_when_empty() {
        let mut tree = DocumentTree::new();
        let para = tree.add_paragraph();
        let start = tree
            .append_child(
                para,
                ElementKind::BookmarkStart {
                    id: 2,
                    name: "City".into(),
                    column_first: None,
                },
            )
            .unwrap();
        tree.append_child(para, ElementKind::BookmarkEnd { id: 2 })
            .unwrap();

        let provider = FormatProvider::new();
        write_value(&mut tree, start, &FieldKind::Simple, Some("Lisbon"), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &FieldKind::Simple, &provider).as_deref(),
            Some("Lisbon")
        );
    }

    #[test]
    fn test_simple_write_collapses_extra_texts() {
        let mut tree = DocumentTree::new();
        let para = tree.add_paragraph();
        let start = tree
            .append_child(
                para,
                ElementKind::BookmarkStart {
                    id: 2,
                    name: "City".into(),
                    column_first: None,
                },
            )
            .unwrap();
        tree.add_text_run(para, None, "first").unwrap();
        tree.add_text_run(para, None, "second").unwrap();
        tree.append_child(para, ElementKind::BookmarkEnd { id: 2 })
            .unwrap();
        let outside = tree.add_text_run(para, None, "outside").unwrap();

        let provider = FormatProvider::new();
        write_value(&mut tree, start, &FieldKind::Simple, Some("Porto"), &provider).unwrap();

        let texts: Vec<&str> = tree
            .descendants(para)
            .filter_map(|d| tree.text_of(d))
            .collect();
        assert_eq!(texts, vec!["Porto", "outside"]);
        assert_eq!(tree.parent(outside), Some(para));
    }

    #[test]
    fn test_broken_anchor_is_a_no_op() {
        let mut tree = DocumentTree::new();
        let para = tree.add_paragraph();
        // Start marker with no matching end
        let start = tree
            .append_child(
                para,
                ElementKind::BookmarkStart {
                    id: 9,
                    name: "Orphan".into(),
                    column_first: None,
                },
            )
            .unwrap();
        let snapshot: Vec<NodeId> = tree.descendants(tree.root()).collect();

        let provider = FormatProvider::new();
        write_value(&mut tree, start, &FieldKind::Simple, Some("x"), &provider).unwrap();
        let after: Vec<NodeId> = tree.descendants(tree.root()).collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn test_table_column_write_overwrites_and_appends() {
        let mut tree = DocumentTree::new();
        let table = tree.append_child(tree.root(), ElementKind::Table).unwrap();
        let row = tree.append_child(table, ElementKind::TableRow).unwrap();
        // Cell 0 carries the bookmark, cell 1 has text, cell 2 is empty
        for _ in 0..3 {
            let cell = tree.append_child(row, ElementKind::TableCell).unwrap();
            tree.append_child(cell, ElementKind::Paragraph).unwrap();
        }
        let cells: Vec<NodeId> = tree.children(row).to_vec();
        let first_para = tree.children(cells[0])[0];
        let start = tree
            .append_child(
                first_para,
                ElementKind::BookmarkStart {
                    id: 3,
                    name: "Amount".into(),
                    column_first: Some(1),
                },
            )
            .unwrap();
        let second_para = tree.children(cells[1])[0];
        tree.add_text_run(second_para, None, "stale").unwrap();

        let provider = FormatProvider::new();
        let kind = FieldKind::TableColumn { column: 1 };
        write_value(&mut tree, start, &kind, Some("42"), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &kind, &provider).as_deref(),
            Some("42")
        );

        let empty = FieldKind::TableColumn { column: 2 };
        write_value(&mut tree, start, &empty, Some("fresh"), &provider).unwrap();
        assert_eq!(
            read_value(&tree, start, &empty, &provider).as_deref(),
            Some("fresh")
        );
    }

    proptest! {
        #[test]
        fn prop_truncation_never_exceeds_limit(value in "\\PC{0,40}", max in 0usize..12) {
            let mut tree = DocumentTree::new();
            let descriptor = FormFieldData::text("Field").with_max_length(max);
            let start = scripted_field(&mut tree, descriptor, Some(("", None)));
            let kind = classify::classify(&tree, start).unwrap();
            let provider = FormatProvider::new();

            write_value(&mut tree, start, &kind, Some(&value), &provider).unwrap();
            let stored = read_value(&tree, start, &kind, &provider).unwrap_or_default();
            prop_assert!(stored.graphemes(true).count() <= max);
        }

        #[test]
        fn prop_write_is_idempotent(value in "[a-zA-Z0-9 ]{1,20}") {
            let mut tree = DocumentTree::new();
            let start = scripted_field(&mut tree, FormFieldData::text("Field"), Some(("seed", None)));
            let kind = classify::classify(&tree, start).unwrap();
            let provider = FormatProvider::new();

            write_value(&mut tree, start, &kind, Some(&value), &provider).unwrap();
            let first = read_value(&tree, start, &kind, &provider);
            write_value(&mut tree, start, &kind, Some(&value), &provider).unwrap();
            let second = read_value(&tree, start, &kind, &provider);
            prop_assert_eq!(first, second);
        }
    }
}
