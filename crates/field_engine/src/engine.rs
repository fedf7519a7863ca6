//! Engine facade
//!
//! Ties location, classification, reading and writing together behind a
//! small API keyed by bookmark name or node handle. Hidden bookmarks
//! (reserved `_` prefix) are excluded from bulk operations but stay
//! addressable by name.

use crate::classify;
use crate::format::FormatProvider;
use crate::locator;
use crate::mutator;
use crate::reader;
use crate::Result;
use doc_tree::{DocumentTree, NodeId};
use std::collections::HashMap;
use tracing::debug;

/// Bookmark-anchored form-field resolution and mutation
#[derive(Debug, Clone, Default)]
pub struct FieldEngine {
    provider: FormatProvider,
}

impl FieldEngine {
    /// Create an engine with the invariant format provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom format provider
    pub fn with_provider(provider: FormatProvider) -> Self {
        Self { provider }
    }

    /// The format provider in effect
    pub fn provider(&self) -> &FormatProvider {
        &self.provider
    }

    /// Find a bookmark-start marker by name, case-insensitive, first match
    /// in document order
    pub fn find_bookmark(&self, tree: &DocumentTree, name: &str) -> Option<NodeId> {
        locator::all_bookmarks(tree).into_iter().find(|&start| {
            locator::bookmark_name(tree, start)
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    /// Read the rendered value of the field anchored at `start`
    pub fn read(&self, tree: &DocumentTree, start: NodeId) -> Result<Option<String>> {
        let kind = classify::classify(tree, start)?;
        debug!(%start, ?kind, "Reading field");
        Ok(reader::read_value(tree, start, &kind, &self.provider))
    }

    /// Write a value into the field anchored at `start`
    pub fn write(&self, tree: &mut DocumentTree, start: NodeId, value: Option<&str>) -> Result<()> {
        let kind = classify::classify(tree, start)?;
        debug!(%start, ?kind, "Writing field");
        mutator::write_value(tree, start, &kind, value, &self.provider)
    }

    /// Read a field by bookmark name; an unknown name reads as no value
    pub fn read_by_name(&self, tree: &DocumentTree, name: &str) -> Result<Option<String>> {
        match self.find_bookmark(tree, name) {
            Some(start) => self.read(tree, start),
            None => Ok(None),
        }
    }

    /// Write a field by bookmark name; an unknown name is ignored
    pub fn write_by_name(
        &self,
        tree: &mut DocumentTree,
        name: &str,
        value: Option<&str>,
    ) -> Result<()> {
        match self.find_bookmark(tree, name) {
            Some(start) => self.write(tree, start, value),
            None => {
                debug!(name, "No such bookmark, ignoring write");
                Ok(())
            }
        }
    }

    /// Read every field into a name-to-value map
    ///
    /// Fields without a rendered value map to the empty string. Hidden
    /// bookmarks are skipped unless `include_hidden` is set.
    pub fn read_all(
        &self,
        tree: &DocumentTree,
        include_hidden: bool,
    ) -> Result<HashMap<String, String>> {
        let mut values = HashMap::new();
        for start in locator::all_bookmarks(tree) {
            let Some(name) = locator::bookmark_name(tree, start).map(str::to_string) else {
                continue;
            };
            if !include_hidden && locator::is_hidden(&name) {
                continue;
            }
            let value = self.read(tree, start)?.unwrap_or_default();
            values.insert(name, value);
        }
        Ok(values)
    }

    /// Write a batch of values keyed by bookmark name
    ///
    /// Names are matched case-insensitively; keys with no matching bookmark
    /// are ignored. The first format error aborts the batch, leaving earlier
    /// writes in place.
    pub fn write_all(
        &self,
        tree: &mut DocumentTree,
        values: &HashMap<String, String>,
    ) -> Result<()> {
        for start in locator::all_bookmarks(tree) {
            let Some(name) = locator::bookmark_name(tree, start).map(str::to_string) else {
                continue;
            };
            let entry = values
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&name));
            if let Some((_, value)) = entry {
                self.write(tree, start, Some(value))?;
            }
        }
        Ok(())
    }
}
