//! Partition types
//!
//! Configuration for time-range partitioning.

use serde::{Deserialize, Serialize};

/// Default number of partitions
pub const DEFAULT_PARTITIONS: usize = 10;

/// Ranges shorter than this (10 minutes) are not partitioned
pub const DEFAULT_MIN_SPAN_MS: i64 = 10 * 60 * 1000;

/// Configuration for partitioning a time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Target number of partitions
    pub partitions: usize,
    /// Minimum range width worth partitioning
    pub min_span_ms: i64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            partitions: DEFAULT_PARTITIONS,
            min_span_ms: DEFAULT_MIN_SPAN_MS,
        }
    }
}

impl PartitionConfig {
    /// Create a partition config
    pub fn new(partitions: usize, min_span_ms: i64) -> Self {
        Self {
            partitions,
            min_span_ms,
        }
    }
}
