//! YAML Loader module
//!
//! Parse export definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `ExportDefinition` - credentials, filter, mapping and fetch tuning
//! - `${NAME}` credential expansion at load time
//! - YAML parsing with validation

mod parser;
mod types;

pub use parser::{expand_env, load_definition, load_definition_from_str, validate_definition};
pub use types::{
    AuthDefinition, ExportDefinition, ExportSettingsDefinition, RateLimitDefinition,
    SpecDefinition,
};
