//! Form-field descriptor block
//!
//! A descriptor declares a bookmark's form-field kind and constraints. It
//! is owned by a bookmark when its name equals the bookmark name
//! (case-insensitive); the descriptor node itself sits inside the run that
//! carries the field's `Begin` field character.

use serde::{Deserialize, Serialize};

/// Declared input type of a text form field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextInputType {
    /// Free text
    #[default]
    Regular,
    /// Date-formatted text; the output format applies on write
    Date,
    /// Numeric text
    Number,
}

/// Kind-specific settings of a form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormFieldSettings {
    /// Text input with optional constraints
    Text {
        /// Value substituted when a write supplies no value
        default: Option<String>,
        /// Hard cut applied to written values, in grapheme clusters
        max_length: Option<usize>,
        /// Declared input type
        input_type: TextInputType,
        /// Output format (Word-style codes, e.g. "yyyy-MM-dd")
        format: Option<String>,
    },
    /// Checkbox with current boolean state
    Checkbox { checked: bool },
}

/// Form-field descriptor metadata reachable from a bookmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFieldData {
    /// Field name; must match the owning bookmark's name (case-insensitive)
    pub name: String,
    /// Kind-specific settings
    pub settings: FormFieldSettings,
}

impl FormFieldData {
    /// Create a plain text field descriptor
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: FormFieldSettings::Text {
                default: None,
                max_length: None,
                input_type: TextInputType::Regular,
                format: None,
            },
        }
    }

    /// Create a date text field descriptor with an output format
    pub fn date(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: FormFieldSettings::Text {
                default: None,
                max_length: None,
                input_type: TextInputType::Date,
                format: Some(format.into()),
            },
        }
    }

    /// Create a checkbox field descriptor
    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            settings: FormFieldSettings::Checkbox { checked },
        }
    }

    /// Set the default value (text fields only; ignored for checkboxes)
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        if let FormFieldSettings::Text { default, .. } = &mut self.settings {
            *default = Some(value.into());
        }
        self
    }

    /// Set the maximum length (text fields only; ignored for checkboxes)
    pub fn with_max_length(mut self, max: usize) -> Self {
        if let FormFieldSettings::Text { max_length, .. } = &mut self.settings {
            *max_length = Some(max);
        }
        self
    }

    /// Check whether this descriptor matches a bookmark name
    pub fn matches_name(&self, bookmark_name: &str) -> bool {
        self.name.eq_ignore_ascii_case(bookmark_name)
    }

    /// Check whether this descriptor declares a checkbox
    pub fn is_checkbox(&self) -> bool {
        matches!(self.settings, FormFieldSettings::Checkbox { .. })
    }
}
