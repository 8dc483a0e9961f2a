//! YAML parser for export definitions
//!
//! Parses and validates export definition files. Credentials written as
//! `${NAME}` are resolved from the environment once, here.

use crate::error::{Error, Result};
use crate::loader::types::ExportDefinition;
use crate::mapping::{MappingRule, RuleMode};
use crate::pagination::DEFAULT_PAGE_SIZE;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Load an export definition from a YAML file
pub fn load_definition(path: impl AsRef<Path>) -> Result<ExportDefinition> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read export definition '{}': {}",
            path.display(),
            e
        ))
    })?;
    load_definition_from_str(&content)
}

/// Load an export definition from a YAML string
pub fn load_definition_from_str(yaml: &str) -> Result<ExportDefinition> {
    let mut def: ExportDefinition = serde_yaml::from_str(yaml)?;

    let lookup = |name: &str| std::env::var(name).ok();
    let auth = &mut def.spec.auth;
    auth.site = expand_env(&auth.site, lookup)?;
    auth.api_key = expand_env(&auth.api_key, lookup)?;
    auth.app_key = expand_env(&auth.app_key, lookup)?;

    validate_definition(&def)?;
    Ok(def)
}

/// Matches `${NAME}` environment references
static ENV_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Replace every `${NAME}` in `value` using `lookup`.
///
/// An unresolved, malformed or unterminated reference is a configuration error.
pub fn expand_env<F>(value: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if ENV_REF_REGEX.replace_all(value, "").contains("${") {
        return Err(Error::config(format!(
            "Malformed variable reference in '{value}'"
        )));
    }

    let mut missing: Option<String> = None;
    let expanded = ENV_REF_REGEX.replace_all(value, |caps: &Captures| {
        let name = &caps[1];
        lookup(name).unwrap_or_else(|| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });

    match missing {
        Some(name) => Err(Error::config(format!(
            "Environment variable '{name}' is not set"
        ))),
        None => Ok(expanded.into_owned()),
    }
}

/// Validate an export definition
pub fn validate_definition(def: &ExportDefinition) -> Result<()> {
    let spec = &def.spec;

    if spec.auth.api_key.is_empty() {
        return Err(Error::missing_field("spec.auth.api_key"));
    }
    if spec.auth.app_key.is_empty() {
        return Err(Error::missing_field("spec.auth.app_key"));
    }

    if spec.filter.from > spec.filter.to {
        return Err(Error::invalid_value(
            "spec.filter",
            format!(
                "from ({}) must not be after to ({})",
                spec.filter.from, spec.filter.to
            ),
        ));
    }

    for (i, rule) in spec.mapping.iter().enumerate() {
        validate_rule(i, rule)?;
    }

    let export = &spec.export;
    if export.partitions == 0 {
        return Err(Error::invalid_value(
            "spec.export.partitions",
            "must be at least 1",
        ));
    }
    if !(1..=DEFAULT_PAGE_SIZE).contains(&export.page_size) {
        return Err(Error::invalid_value(
            "spec.export.page_size",
            format!("must be between 1 and {DEFAULT_PAGE_SIZE}"),
        ));
    }
    if export.max_concurrency == Some(0) {
        return Err(Error::invalid_value(
            "spec.export.max_concurrency",
            "must be at least 1",
        ));
    }
    if let Some(limit) = export.rate_limit {
        if limit.requests == 0 || limit.period_secs == 0 {
            return Err(Error::invalid_value(
                "spec.export.rate_limit",
                "requests and period_secs must be at least 1",
            ));
        }
    }

    Ok(())
}

/// Validate one mapping rule
fn validate_rule(index: usize, rule: &MappingRule) -> Result<()> {
    if rule.field.is_empty() {
        return Err(Error::invalid_value(
            format!("spec.mapping[{index}].field"),
            "cannot be empty",
        ));
    }
    if rule.source.is_empty() {
        return Err(Error::invalid_value(
            format!("spec.mapping[{index}].source"),
            format!("rule '{}' has an empty source", rule.field),
        ));
    }
    if let RuleMode::Expand { path, width } = rule.mode() {
        if path.is_empty() {
            return Err(Error::invalid_value(
                format!("spec.mapping[{index}].inner_field"),
                format!("expansion rule '{}' needs an inner_field", rule.field),
            ));
        }
        if width == Some(0) {
            return Err(Error::invalid_value(
                format!("spec.mapping[{index}].width"),
                "must be at least 1",
            ));
        }
    }
    Ok(())
}
