//! Mapping types
//!
//! Declarative rules describing how a record becomes output columns.

use serde::{Deserialize, Serialize};

/// Source path sentinel selecting array-expansion mode
pub const EXPAND_SENTINEL: &str = "-";

/// One mapping rule from the export definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MappingRule {
    /// Output column name
    pub field: String,
    /// Dotted attribute path, or `-` for array expansion
    #[serde(alias = "dd_field", alias = "source_path")]
    pub source: String,
    /// Dotted path used in expansion mode
    #[serde(default)]
    pub inner_field: String,
    /// Fixed number of expansion columns (pad or truncate)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
}

/// How a rule is interpreted, decided solely by the source sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode<'a> {
    /// Single column at a dotted path
    Scalar {
        /// Dotted path into the attribute bag
        path: &'a str,
    },
    /// One column per element of the deepest array found along `path`
    Expand {
        /// Dotted path through the array to the element value
        path: &'a str,
        /// Fixed column count, if pinned
        width: Option<usize>,
    },
}

impl MappingRule {
    /// Create a scalar rule
    pub fn scalar(field: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            source: source.into(),
            inner_field: String::new(),
            width: None,
        }
    }

    /// Create an array-expansion rule
    pub fn expand(field: impl Into<String>, inner_field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            source: EXPAND_SENTINEL.to_string(),
            inner_field: inner_field.into(),
            width: None,
        }
    }

    /// Pin the number of expansion columns
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Interpretation mode of this rule
    pub fn mode(&self) -> RuleMode<'_> {
        if self.source == EXPAND_SENTINEL {
            RuleMode::Expand {
                path: &self.inner_field,
                width: self.width,
            }
        } else {
            RuleMode::Scalar { path: &self.source }
        }
    }

    /// Whether this rule expands an array
    pub fn is_expansion(&self) -> bool {
        matches!(self.mode(), RuleMode::Expand { .. })
    }

    /// Header columns contributed by this rule
    pub fn header_columns(&self) -> Vec<String> {
        match self.mode() {
            RuleMode::Expand {
                width: Some(width), ..
            } => (1..=width).map(|i| format!("{}_{i}", self.field)).collect(),
            _ => vec![self.field.clone()],
        }
    }
}

/// What to do with a record whose mapping fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordErrorPolicy {
    /// Abort the run with the extraction error
    #[default]
    Fail,
    /// Log and drop the record
    Skip,
}

/// Rows produced from one batch of records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projected {
    /// Successfully projected rows, in record order
    pub rows: Vec<crate::types::OutputRow>,
    /// Records dropped under `RecordErrorPolicy::Skip`
    pub skipped: usize,
}
