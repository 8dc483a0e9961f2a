//! Sink trait and in-memory sink
//!
//! A sink receives the header once and then batches of rows, possibly from
//! several workers at once. Implementations serialize appends internally;
//! one `append_rows` call is written as one uninterrupted block.

use crate::error::{Error, Result};
use crate::types::OutputRow;
use std::sync::{Mutex, MutexGuard};

/// Append-only tabular destination
pub trait Sink: Send + Sync {
    /// Write the header row. Called once per run, before any data row.
    fn write_header(&self, columns: &[String]) -> Result<()>;

    /// Append a batch of rows atomically
    fn append_rows(&self, rows: &[OutputRow]) -> Result<()>;

    /// Flush buffered output
    fn flush(&self) -> Result<()>;
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::output("sink lock poisoned by a failed writer"))
}

#[derive(Debug, Default)]
struct MemoryState {
    header: Option<Vec<String>>,
    header_writes: usize,
    batches: Vec<Vec<OutputRow>>,
    flushes: usize,
}

/// Sink that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// The header, if written
    pub fn header(&self) -> Option<Vec<String>> {
        self.state.lock().ok().and_then(|s| s.header.clone())
    }

    /// How many times `write_header` was called
    pub fn header_writes(&self) -> usize {
        self.state.lock().map(|s| s.header_writes).unwrap_or(0)
    }

    /// Every appended batch, in arrival order
    pub fn batches(&self) -> Vec<Vec<OutputRow>> {
        self.state
            .lock()
            .map(|s| s.batches.clone())
            .unwrap_or_default()
    }

    /// All rows, flattened in arrival order
    pub fn rows(&self) -> Vec<OutputRow> {
        self.batches().into_iter().flatten().collect()
    }

    /// How many times `flush` was called
    pub fn flushes(&self) -> usize {
        self.state.lock().map(|s| s.flushes).unwrap_or(0)
    }
}

impl Sink for MemorySink {
    fn write_header(&self, columns: &[String]) -> Result<()> {
        let mut state = lock(&self.state)?;
        state.header_writes += 1;
        if state.header.is_some() {
            return Err(Error::output("header already written"));
        }
        state.header = Some(columns.to_vec());
        Ok(())
    }

    fn append_rows(&self, rows: &[OutputRow]) -> Result<()> {
        let mut state = lock(&self.state)?;
        if state.header.is_none() {
            return Err(Error::output("rows appended before header"));
        }
        state.batches.push(rows.to_vec());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        lock(&self.state)?.flushes += 1;
        Ok(())
    }
}
