//! CLI module
//!
//! Command-line interface for running exports.
//!
//! # Commands
//!
//! - `validate` - Fetch a sample and print the projected rows
//! - `export` - Export the configured range into a CSV file
//! - `intervals` - Show the partition plan

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
