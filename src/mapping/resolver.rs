//! Mapping resolver
//!
//! Resolves a single mapping rule against a record's attribute bag.
//! Paths are dotted (`a.b.c`); when a step lands on an array of objects
//! the remaining path is searched inside each element in order and the
//! first match wins. Expansion takes the deepest array along the path.

use super::types::{MappingRule, RuleMode};
use crate::error::{Error, Result};
use serde_json::Value;

/// Resolve `rule` against `root`, returning one cell (scalar mode) or one
/// cell per array element (expansion mode).
pub fn resolve(rule: &MappingRule, root: &Value) -> Result<Vec<String>> {
    match rule.mode() {
        RuleMode::Scalar { path } => resolve_scalar(rule, path, root).map(|cell| vec![cell]),
        RuleMode::Expand { path, width } => {
            let mut cells = resolve_expansion(rule, path, root)?;
            if let Some(width) = width {
                cells.resize(width, String::new());
            }
            Ok(cells)
        }
    }
}

fn resolve_scalar(rule: &MappingRule, path: &str, root: &Value) -> Result<String> {
    let segments = split_path(path);
    deep_search(root, &segments)
        .map(render_value)
        .ok_or_else(|| Error::field_not_found(&rule.field, path, root))
}

fn resolve_expansion(rule: &MappingRule, path: &str, root: &Value) -> Result<Vec<String>> {
    let segments = split_path(path);

    // The deepest prefix landing on an array is the sequence; the rest addresses each element.
    for split in (1..=segments.len()).rev() {
        if let Some(Value::Array(items)) = deep_search(root, &segments[..split]) {
            let inner = &segments[split..];
            return items
                .iter()
                .map(|item| {
                    deep_search(item, inner)
                        .map(render_value)
                        .ok_or_else(|| Error::field_not_found(&rule.field, path, item))
                })
                .collect();
        }
    }

    // No array anywhere along the path: report where it stops matching.
    let mut last = root;
    for split in 1..=segments.len() {
        let prefix = &segments[..split];
        last = deep_search(root, prefix)
            .ok_or_else(|| Error::field_not_found(&rule.field, prefix.join("."), root))?;
    }
    Err(Error::not_a_sequence(&rule.field, path, last))
}

/// Walk `segments` through nested objects, descending into arrays of
/// objects when a step would otherwise fail.
pub fn deep_search<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value);
    };

    match value {
        Value::Object(map) => deep_search(map.get(*head)?, rest),
        Value::Array(items) => items
            .iter()
            .filter(|item| item.is_object())
            .find_map(|item| deep_search(item, segments)),
        _ => None,
    }
}

/// Render a JSON value as one CSV cell
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}
