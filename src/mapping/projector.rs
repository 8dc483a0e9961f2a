//! Record projector
//!
//! Turns log records into output rows: five fixed columns followed by the
//! columns of each mapping rule, in rule order.

use super::resolver::resolve;
use super::types::{MappingRule, Projected, RecordErrorPolicy};
use crate::error::Result;
use crate::types::{OutputRow, Record};
use chrono::SecondsFormat;
use serde_json::Value;
use tracing::warn;

/// Columns emitted before any mapping-derived column
pub const FIXED_COLUMNS: [&str; 5] = ["timestamp", "service", "status", "message", "attributes"];

/// Applies an ordered rule set to records
#[derive(Debug, Clone)]
pub struct RecordProjector {
    rules: Vec<MappingRule>,
}

impl RecordProjector {
    /// Create a projector for the given rules
    pub fn new(rules: Vec<MappingRule>) -> Self {
        Self { rules }
    }

    /// The rules, in column order
    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    /// Header row for this rule set
    pub fn header(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(ToString::to_string)
            .chain(self.rules.iter().flat_map(MappingRule::header_columns))
            .collect()
    }

    /// Project one record. The first failing rule aborts the record.
    pub fn project(&self, record: &Record) -> Result<OutputRow> {
        let quoted_message = format!("\"{}\"", record.message.as_deref().unwrap_or_default());

        let mut row = vec![
            record
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            record.service.clone().unwrap_or_default(),
            record.status.clone().unwrap_or_default(),
            quoted_message.clone(),
            serde_json::to_string(&record.attributes)?,
        ];

        // Rules may address the message like any other attribute.
        let mut bag = record.attributes.clone();
        bag.insert("message".to_string(), Value::String(quoted_message));
        let root = Value::Object(bag);

        for rule in &self.rules {
            row.extend(resolve(rule, &root)?);
        }
        Ok(row)
    }

    /// Project a batch, applying `policy` to records that fail
    pub fn project_batch(
        &self,
        records: &[Record],
        policy: RecordErrorPolicy,
    ) -> Result<Projected> {
        let mut projected = Projected {
            rows: Vec::with_capacity(records.len()),
            skipped: 0,
        };

        for record in records {
            match self.project(record) {
                Ok(row) => projected.rows.push(row),
                Err(e) if e.is_extraction() && policy == RecordErrorPolicy::Skip => {
                    warn!(
                        timestamp = %record.timestamp,
                        id = record.id.as_deref().unwrap_or("-"),
                        "Skipping record: {e}"
                    );
                    projected.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(projected)
    }

    /// Widest expansion seen per expansion rule across a sample of records.
    /// Records a rule cannot resolve are ignored.
    pub fn suggest_expansion_widths(&self, records: &[Record]) -> Vec<(String, usize)> {
        self.rules
            .iter()
            .filter(|rule| rule.is_expansion())
            .map(|rule| {
                let unpinned = MappingRule {
                    width: None,
                    ..rule.clone()
                };
                let widest = records
                    .iter()
                    .filter_map(|record| {
                        let root = Value::Object(record.attributes.clone());
                        resolve(&unpinned, &root).ok().map(|cells| cells.len())
                    })
                    .max()
                    .unwrap_or(0);
                (rule.field.clone(), widest)
            })
            .collect()
    }
}
