//! Interval partitioner
//!
//! Splits a time range into contiguous sub-ranges for parallel fetching.

use super::types::PartitionConfig;
use crate::types::Interval;

/// Splits time ranges according to a `PartitionConfig`
#[derive(Debug, Clone, Default)]
pub struct IntervalPartitioner {
    config: PartitionConfig,
}

impl IntervalPartitioner {
    /// Create a partitioner
    pub fn new(config: PartitionConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Split `[from, to)` into consecutive intervals.
    ///
    /// Ranges narrower than the minimum span come back whole. Otherwise the
    /// range is cut into `partitions` pieces of `(to - from) / partitions`
    /// and the last piece is stretched to end exactly at `to`, so the pieces
    /// always cover the range with no gap and no overlap.
    pub fn split(&self, from: i64, to: i64) -> Vec<Interval> {
        let span = to - from;
        let count = self.config.partitions.max(1) as i64;

        if span < self.config.min_span_ms || count == 1 {
            return vec![Interval::new(from, to)];
        }

        let step = span / count;
        if step == 0 {
            return vec![Interval::new(from, to)];
        }

        let mut intervals: Vec<Interval> = (0..count)
            .map(|i| Interval::new(from + i * step, from + (i + 1) * step))
            .collect();

        if let Some(last) = intervals.last_mut() {
            last.to = to;
        }
        intervals
    }
}

/// Split with explicit parameters
pub fn split_range(from: i64, to: i64, partitions: usize, min_span_ms: i64) -> Vec<Interval> {
    IntervalPartitioner::new(PartitionConfig::new(partitions, min_span_ms)).split(from, to)
}
