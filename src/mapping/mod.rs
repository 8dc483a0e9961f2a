//! Field mapping module
//!
//! Resolves declarative mapping rules against semi-structured log records.
//!
//! # Overview
//!
//! - `MappingRule` - one output column (or a family of columns) per rule
//! - `resolve` - dotted-path lookup with deep search through arrays
//! - `RecordProjector` - fixed columns plus rule columns for each record
//!
//! A rule whose `source` is `-` expands an array into one column per
//! element. Without a pinned `width` the number of such columns follows
//! the data, so rows may differ in length.

mod projector;
mod resolver;
mod types;

pub use projector::{RecordProjector, FIXED_COLUMNS};
pub use resolver::{deep_search, render_value, resolve};
pub use types::{MappingRule, Projected, RecordErrorPolicy, RuleMode, EXPAND_SENTINEL};
