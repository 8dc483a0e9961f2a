//! Execution engine module
//!
//! Fetch orchestration from the source into a sink.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Exporter` - runs a sequential or partitioned parallel export
//! - `ExportConfig` - page size, partitioning, pacing and error policy
//! - `Exporter::validate` - small sample projected without touching a sink
//!
//! In parallel mode every partition runs its own cursor loop in a task.
//! Workers send one `PageBatch` per page over a bounded channel and the
//! orchestrating task appends each batch to the sink. The first failing
//! worker aborts the rest and its error is returned. Rows from different
//! partitions arrive in no particular order.

mod types;

pub use types::{
    ExportConfig, ExportMode, ExportStats, PageBatch, Validation, DEFAULT_CHANNEL_CAPACITY,
};

use crate::error::{Error, Result};
use crate::http::RateLimiter;
use crate::mapping::{MappingRule, RecordErrorPolicy, RecordProjector};
use crate::output::Sink;
use crate::pagination::{CursorLoop, FetchSettings, PageSource};
use crate::partition::IntervalPartitioner;
use crate::types::{FilterSpec, Interval, Record};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Exports one filter's records through a mapping into a sink
pub struct Exporter {
    source: Arc<dyn PageSource>,
    projector: Arc<RecordProjector>,
    filter: FilterSpec,
    config: ExportConfig,
    rate_limiter: Option<RateLimiter>,
}

impl Exporter {
    /// Create an exporter with default configuration and no rate limiter
    pub fn new(source: Arc<dyn PageSource>, rules: Vec<MappingRule>, filter: FilterSpec) -> Self {
        Self {
            source,
            projector: Arc::new(RecordProjector::new(rules)),
            filter,
            config: ExportConfig::default(),
            rate_limiter: None,
        }
    }

    /// Set export configuration
    #[must_use]
    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a rate limiter across every request of the run
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Export configuration
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// The filter being exported
    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Output header
    pub fn header(&self) -> Vec<String> {
        self.projector.header()
    }

    /// Partition plan for parallel mode
    pub fn plan(&self) -> Vec<Interval> {
        IntervalPartitioner::new(self.config.partition).split(self.filter.from, self.filter.to)
    }

    /// Run in the given mode
    pub async fn run(&self, mode: ExportMode, sink: &dyn Sink) -> Result<ExportStats> {
        match mode {
            ExportMode::Sequential => self.run_sequential(sink).await,
            ExportMode::Parallel => self.run_parallel(sink).await,
        }
    }

    /// Fetch the whole range with a single cursor loop
    pub async fn run_sequential(&self, sink: &dyn Sink) -> Result<ExportStats> {
        let start = Instant::now();
        let mut stats = ExportStats::new();
        let interval = self.filter.interval();

        info!(
            query = %self.filter.query,
            "Starting sequential export of {interval}"
        );
        sink.write_header(&self.header())?;

        let mut settings = self.fetch_settings(self.config.pacing_delay);
        settings.max_records = self.config.max_records;
        let mut cursor_loop = CursorLoop::new(self.source.as_ref(), self.filter.clone(), settings);

        while let Some(records) = cursor_loop.next_page().await? {
            let batch = project_page(
                &self.projector,
                interval,
                &records,
                self.config.on_record_error,
            )?;
            sink.append_rows(&batch.rows)?;
            stats.add_batch(&batch);
        }
        sink.flush()?;
        stats.add_partition();

        stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Completed sequential export: {} rows from {} pages",
            stats.rows_written, stats.pages_fetched
        );
        Ok(stats)
    }

    /// Fetch each partition of the range concurrently
    pub async fn run_parallel(&self, sink: &dyn Sink) -> Result<ExportStats> {
        let start = Instant::now();
        let mut stats = ExportStats::new();
        let intervals = self.plan();
        let concurrency = self.config.max_concurrency.max(1);

        if self.config.max_records.is_some() {
            warn!("max_records only applies to sequential runs; ignoring it");
        }
        info!(
            query = %self.filter.query,
            partitions = intervals.len(),
            concurrency,
            "Starting parallel export of {}",
            self.filter.interval()
        );
        sink.write_header(&self.header())?;

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let (tx, mut rx) = mpsc::channel::<PageBatch>(self.config.channel_capacity.max(1));
        let mut workers: JoinSet<Result<Interval>> = JoinSet::new();

        for interval in intervals {
            let source = Arc::clone(&self.source);
            let projector = Arc::clone(&self.projector);
            let semaphore = Arc::clone(&semaphore);
            let filter = self.filter.narrowed(interval);
            let settings = self.fetch_settings(Duration::ZERO);
            let policy = self.config.on_record_error;
            let tx = tx.clone();

            workers.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::worker(format!("Semaphore closed: {e}")))?;
                run_partition(source.as_ref(), &projector, filter, settings, policy, tx).await
            });
        }
        drop(tx);

        let mut first_error: Option<Error> = None;
        let mut draining = true;
        let mut joining = true;

        while draining || joining {
            tokio::select! {
                batch = rx.recv(), if draining => match batch {
                    Some(batch) if first_error.is_none() => {
                        if let Err(e) = sink.append_rows(&batch.rows) {
                            error!("Sink append failed: {e}");
                            first_error = Some(e);
                            workers.abort_all();
                        } else {
                            stats.add_batch(&batch);
                        }
                    }
                    Some(_) => {}
                    None => draining = false,
                },
                joined = workers.join_next(), if joining => match joined {
                    Some(Ok(Ok(interval))) => {
                        info!("Partition {interval} completed");
                        stats.add_partition();
                    }
                    Some(Ok(Err(e))) => {
                        error!("Partition failed: {e}");
                        if first_error.is_none() {
                            first_error = Some(e);
                            workers.abort_all();
                        }
                    }
                    Some(Err(join_err)) if join_err.is_cancelled() && first_error.is_some() => {
                        // Expected: siblings cancelled after the first failure.
                    }
                    Some(Err(join_err)) => {
                        if first_error.is_none() {
                            first_error = Some(Error::worker(format!(
                                "Partition task panicked: {join_err}"
                            )));
                            workers.abort_all();
                        }
                    }
                    None => joining = false,
                },
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        sink.flush()?;

        stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Completed parallel export: {} rows from {} pages in {} partitions",
            stats.rows_written, stats.pages_fetched, stats.partitions_completed
        );
        Ok(stats)
    }

    /// Fetch at most `sample` records sequentially and project them without
    /// writing anywhere. Sequential pacing applies. Any mapping mismatch is
    /// returned as an error.
    pub async fn validate(&self, sample: usize) -> Result<Validation> {
        let interval = self.filter.interval();
        let mut settings = self.fetch_settings(self.config.pacing_delay);
        settings.page_size = sample.clamp(1, self.config.page_size.max(1));
        settings.max_records = Some(sample);

        let mut rows = vec![self.header()];
        let mut sampled = Vec::new();
        let mut cursor_loop = CursorLoop::new(self.source.as_ref(), self.filter.clone(), settings);

        while let Some(records) = cursor_loop.next_page().await? {
            let batch =
                project_page(&self.projector, interval, &records, RecordErrorPolicy::Fail)?;
            rows.extend(batch.rows);
            sampled.extend(records);
        }

        info!("Validated mapping against {} records", sampled.len());
        Ok(Validation {
            rows,
            records: sampled.len(),
            suggested_widths: self.projector.suggest_expansion_widths(&sampled),
        })
    }

    fn fetch_settings(&self, pacing_delay: Duration) -> FetchSettings {
        FetchSettings {
            page_size: self.config.page_size,
            pacing_delay,
            max_records: None,
            rate_limiter: self.rate_limiter.clone(),
        }
    }
}

/// One partition's worker: fetch every page of `filter`, project it, and
/// hand the rows to the orchestrator.
async fn run_partition(
    source: &dyn PageSource,
    projector: &RecordProjector,
    filter: FilterSpec,
    settings: FetchSettings,
    policy: RecordErrorPolicy,
    tx: mpsc::Sender<PageBatch>,
) -> Result<Interval> {
    let interval = filter.interval();
    let mut cursor_loop = CursorLoop::new(source, filter, settings);

    while let Some(records) = cursor_loop.next_page().await? {
        let batch = project_page(projector, interval, &records, policy)?;
        tx.send(batch)
            .await
            .map_err(|_| Error::worker(format!("Output channel closed for {interval}")))?;
    }
    Ok(interval)
}

fn project_page(
    projector: &RecordProjector,
    interval: Interval,
    records: &[Record],
    policy: RecordErrorPolicy,
) -> Result<PageBatch> {
    let projected = projector.project_batch(records, policy)?;
    Ok(PageBatch {
        interval,
        rows: projected.rows,
        records: records.len(),
        skipped: projected.skipped,
    })
}
