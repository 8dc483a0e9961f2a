//! Common types used throughout dd-export
//!
//! This module contains the shared data model: the query filter, time
//! intervals, log records, fetched pages and output rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One output row: ordered string cells
pub type OutputRow = Vec<String>;

/// Opaque continuation token returned by the source
pub type Cursor = String;

// ============================================================================
// Filter
// ============================================================================

/// Log query over a time range in epoch milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Search query in the source's query language
    #[serde(default = "default_query")]
    pub query: String,
    /// Range start (epoch ms)
    pub from: i64,
    /// Range end (epoch ms)
    pub to: i64,
}

fn default_query() -> String {
    "*".to_string()
}

impl FilterSpec {
    /// Create a new filter
    pub fn new(query: impl Into<String>, from: i64, to: i64) -> Self {
        Self {
            query: query.into(),
            from,
            to,
        }
    }

    /// Copy of this filter narrowed to one interval
    #[must_use]
    pub fn narrowed(&self, interval: Interval) -> Self {
        Self {
            query: self.query.clone(),
            from: interval.from,
            to: interval.to,
        }
    }

    /// The full range as an interval
    pub fn interval(&self) -> Interval {
        Interval::new(self.from, self.to)
    }

    /// Range width in milliseconds
    pub fn span(&self) -> i64 {
        self.to - self.from
    }
}

// ============================================================================
// Interval
// ============================================================================

/// Half-open time range `[from, to)` in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive start
    pub from: i64,
    /// Exclusive end
    pub to: i64,
}

impl Interval {
    /// Create a new interval
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Width in milliseconds
    pub fn span(&self) -> i64 {
        self.to - self.from
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

// ============================================================================
// Records and pages
// ============================================================================

/// A single log record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Source-assigned event id
    #[serde(default)]
    pub id: Option<String>,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Service name
    #[serde(default)]
    pub service: Option<String>,
    /// Status (info, warn, error, ...)
    #[serde(default)]
    pub status: Option<String>,
    /// Log message
    #[serde(default)]
    pub message: Option<String>,
    /// Semi-structured attribute bag
    #[serde(default)]
    pub attributes: JsonObject,
}

impl Record {
    /// Create a record at the given time with no attributes
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    /// Set the service
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set the status
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replace the attribute bag. Non-object values leave it empty.
    #[must_use]
    pub fn with_attributes(mut self, attributes: JsonValue) -> Self {
        if let JsonValue::Object(map) = attributes {
            self.attributes = map;
        }
        self
    }
}

/// One page returned by the source
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Records on this page
    pub records: Vec<Record>,
    /// Continuation token; `None` means the range is exhausted
    pub next_cursor: Option<Cursor>,
}

impl Page {
    /// Create a final page
    pub fn last(records: Vec<Record>) -> Self {
        Self {
            records,
            next_cursor: None,
        }
    }

    /// Create a page followed by more data
    pub fn with_cursor(records: Vec<Record>, cursor: impl Into<Cursor>) -> Self {
        Self {
            records,
            next_cursor: Some(cursor.into()),
        }
    }

    /// Whether more pages follow
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}
