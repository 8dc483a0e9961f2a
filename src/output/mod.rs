//! Output module
//!
//! Destinations for projected rows.
//!
//! # Overview
//!
//! - `Sink` - header once, then atomic batch appends from any worker
//! - `CsvSink` - CSV file output
//! - `MemorySink` - collects rows in memory (validation, tests)

mod sink;
mod writer;

pub use sink::{MemorySink, Sink};
pub use writer::CsvSink;
