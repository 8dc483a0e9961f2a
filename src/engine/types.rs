//! Engine types
//!
//! Configuration, run statistics and results for the exporter.

use crate::mapping::RecordErrorPolicy;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::partition::PartitionConfig;
use crate::types::{Interval, OutputRow};
use serde::Serialize;
use std::time::Duration;

/// Default capacity of the worker-to-sink channel, in page batches
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// How a run fetches its range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// One cursor loop over the whole range
    #[default]
    Sequential,
    /// One cursor loop per partition, run concurrently
    Parallel,
}

/// Configuration for an export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Records requested per page
    pub page_size: usize,
    /// Partitioning used in parallel mode
    pub partition: PartitionConfig,
    /// Fixed delay before each request in sequential mode
    pub pacing_delay: Duration,
    /// Upper bound on concurrently running partitions
    pub max_concurrency: usize,
    /// What to do with records whose mapping fails
    pub on_record_error: RecordErrorPolicy,
    /// Stop a sequential run after this many records
    pub max_records: Option<usize>,
    /// Page batches buffered between workers and the sink
    pub channel_capacity: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let partition = PartitionConfig::default();
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrency: partition.partitions,
            partition,
            pacing_delay: Duration::ZERO,
            on_record_error: RecordErrorPolicy::Fail,
            max_records: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ExportConfig {
    /// Create a new export config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Set partitioning
    #[must_use]
    pub fn with_partition(mut self, partition: PartitionConfig) -> Self {
        self.partition = partition;
        self
    }

    /// Set sequential pacing delay
    #[must_use]
    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    /// Set the concurrency bound
    #[must_use]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Set record error policy
    #[must_use]
    pub fn with_record_error_policy(mut self, policy: RecordErrorPolicy) -> Self {
        self.on_record_error = policy;
        self
    }

    /// Set max records
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }
}

/// Statistics from an export run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Pages fetched
    pub pages_fetched: usize,
    /// Records fetched
    pub records_fetched: usize,
    /// Rows handed to the sink
    pub rows_written: usize,
    /// Records dropped by the skip policy
    pub records_skipped: usize,
    /// Partitions (or whole ranges) completed
    pub partitions_completed: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExportStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one delivered page
    pub fn add_batch(&mut self, batch: &PageBatch) {
        self.pages_fetched += 1;
        self.records_fetched += batch.records;
        self.rows_written += batch.rows.len();
        self.records_skipped += batch.skipped;
    }

    /// Add a completed partition
    pub fn add_partition(&mut self) {
        self.partitions_completed += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Rows produced from one fetched page
#[derive(Debug, Clone)]
pub struct PageBatch {
    /// Window the page belongs to
    pub interval: Interval,
    /// Projected rows
    pub rows: Vec<OutputRow>,
    /// Records on the page
    pub records: usize,
    /// Records skipped during projection
    pub skipped: usize,
}

/// Result of a validation run
#[derive(Debug, Clone, Default)]
pub struct Validation {
    /// Header followed by one row per sampled record
    pub rows: Vec<OutputRow>,
    /// Records sampled
    pub records: usize,
    /// Widest expansion observed per expansion rule
    pub suggested_widths: Vec<(String, usize)>,
}
