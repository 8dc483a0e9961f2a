//! Error types for dd-export
//!
//! This module defines the error hierarchy for the whole exporter.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// Maximum length of a record snapshot carried inside an extraction error
const SNAPSHOT_LIMIT: usize = 512;

/// The main error type for dd-export
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Field not found for rule '{rule}': path '{path}' does not match record {record}")]
    FieldNotFound {
        rule: String,
        path: String,
        record: String,
    },

    #[error("Rule '{rule}' expected an array at '{path}', found {found}")]
    NotASequence {
        rule: String,
        path: String,
        found: String,
    },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Serialization Errors
    // ============================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Orchestration Errors
    // ============================================================================
    #[error("Worker task failed: {message}")]
    Worker { message: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a field-not-found error carrying a snapshot of the offending record
    pub fn field_not_found(
        rule: impl Into<String>,
        path: impl Into<String>,
        record: &serde_json::Value,
    ) -> Self {
        Self::FieldNotFound {
            rule: rule.into(),
            path: path.into(),
            record: snapshot(record),
        }
    }

    /// Create a not-a-sequence error
    pub fn not_a_sequence(
        rule: impl Into<String>,
        path: impl Into<String>,
        found: &serde_json::Value,
    ) -> Self {
        Self::NotASequence {
            rule: rule.into(),
            path: path.into(),
            found: snapshot(found),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a worker error
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// Whether this error comes from applying a mapping rule to a record
    pub fn is_extraction(&self) -> bool {
        matches!(self, Error::FieldNotFound { .. } | Error::NotASequence { .. })
    }

    /// Whether this error comes from fetching a page
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::HttpStatus { .. } | Error::InvalidUrl(_)
        )
    }
}

/// Render a JSON value compactly, bounded to `SNAPSHOT_LIMIT` characters
fn snapshot(value: &serde_json::Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= SNAPSHOT_LIMIT {
        return text;
    }
    let truncated: String = text.chars().take(SNAPSHOT_LIMIT).collect();
    format!("{truncated}...")
}

/// Result type alias for dd-export
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
