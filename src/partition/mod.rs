//! Partition module
//!
//! Splits a query time window into bounded sub-ranges.
//!
//! # Overview
//!
//! Partitions let the exporter fetch one time window per worker. Every
//! plan covers the original range exactly: intervals are half-open,
//! ordered, adjacent, and the last one ends at the original `to`.

mod intervals;
mod types;

pub use intervals::{split_range, IntervalPartitioner};
pub use types::{PartitionConfig, DEFAULT_MIN_SPAN_MS, DEFAULT_PARTITIONS};
