//! Locale-aware parsing and rendering
//!
//! Every parse/format step in the engine goes through an explicit
//! [`FormatProvider`] rather than an ambient global, so two call sites can
//! never disagree about the locale in effect.

use crate::{FieldError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Date input formats the invariant provider accepts, tried in order
const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Date-time input formats tried after the date-only formats
const DEFAULT_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Locale/format provider threaded through every parse and format call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatProvider {
    /// Rendering of a checked checkbox state
    pub true_text: String,
    /// Rendering of an unchecked checkbox state
    pub false_text: String,
    /// strftime patterns accepted when parsing date field input, in order
    pub date_input_formats: Vec<String>,
}

impl Default for FormatProvider {
    fn default() -> Self {
        Self {
            true_text: "True".to_string(),
            false_text: "False".to_string(),
            date_input_formats: DEFAULT_DATE_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl FormatProvider {
    /// Create the invariant provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the boolean renderings
    pub fn with_boolean_text(
        mut self,
        true_text: impl Into<String>,
        false_text: impl Into<String>,
    ) -> Self {
        self.true_text = true_text.into();
        self.false_text = false_text.into();
        self
    }

    /// Override the accepted date input formats
    pub fn with_date_input_formats(mut self, formats: Vec<String>) -> Self {
        self.date_input_formats = formats;
        self
    }

    /// Render a boolean state
    pub fn format_bool(&self, value: bool) -> String {
        if value {
            self.true_text.clone()
        } else {
            self.false_text.clone()
        }
    }

    /// Parse a checkbox value permissively
    ///
    /// Standard true/false first, then an integer fallback where non-zero
    /// means true. Anything else is a hard error.
    pub fn parse_bool(&self, raw: &str) -> Result<bool> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return Ok(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Ok(false);
        }
        trimmed
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| FieldError::InvalidBoolean(raw.to_string()))
    }

    /// Parse a date field value against the accepted input formats
    pub fn parse_date(&self, raw: &str) -> Result<NaiveDate> {
        let trimmed = raw.trim();
        for format in &self.date_input_formats {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Ok(date);
            }
        }
        for format in DEFAULT_DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(datetime.date());
            }
        }
        Err(FieldError::InvalidDate(raw.to_string()))
    }

    /// Render a date using a Word-style output format string
    pub fn format_date(&self, date: NaiveDate, word_format: &str) -> String {
        date.format(&strftime_pattern(word_format)).to_string()
    }
}

/// Translate Word-style date format codes (yyyy, MMMM, dd, ...) into a
/// chrono strftime pattern. Unknown letters pass through unchanged.
fn strftime_pattern(word_format: &str) -> String {
    let mut out = String::with_capacity(word_format.len());
    let mut chars = word_format.chars().peekable();
    while let Some(c) = chars.next() {
        if !c.is_ascii_alphabetic() {
            if c == '%' {
                out.push_str("%%");
            } else {
                out.push(c);
            }
            continue;
        }
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        match (c, run) {
            ('y', n) if n >= 4 => out.push_str("%Y"),
            ('y', _) => out.push_str("%y"),
            ('M', n) if n >= 4 => out.push_str("%B"),
            ('M', 3) => out.push_str("%b"),
            ('M', 2) => out.push_str("%m"),
            ('M', _) => out.push_str("%-m"),
            ('d', n) if n >= 4 => out.push_str("%A"),
            ('d', 3) => out.push_str("%a"),
            ('d', 2) => out.push_str("%d"),
            ('d', _) => out.push_str("%-d"),
            ('H', n) if n >= 2 => out.push_str("%H"),
            ('H', _) => out.push_str("%-H"),
            ('h', n) if n >= 2 => out.push_str("%I"),
            ('h', _) => out.push_str("%-I"),
            ('m', n) if n >= 2 => out.push_str("%M"),
            ('m', _) => out.push_str("%-M"),
            ('s', n) if n >= 2 => out.push_str("%S"),
            ('s', _) => out.push_str("%-S"),
            (other, n) => {
                for _ in 0..n {
                    out.push(other);
                }
            }
        }
    }
    out
}
