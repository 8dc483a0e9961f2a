//! CSV file writer
//!
//! Writes header and row batches to a CSV file. Rows may differ in length
//! when unpinned array-expansion rules are in use.

use super::sink::{lock, Sink};
use crate::error::{Error, Result};
use crate::types::OutputRow;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
struct CsvState {
    writer: csv::Writer<File>,
    header_written: bool,
    rows_written: usize,
}

/// CSV file sink, safe to share between workers
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    state: Mutex<CsvState>,
}

impl CsvSink {
    /// Create (or truncate) the file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::Output {
            message: format!("Failed to create file '{}': {e}", path.display()),
        })?;
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(file);

        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(CsvState {
                writer,
                header_written: false,
                rows_written: 0,
            }),
        })
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows written so far
    pub fn rows_written(&self) -> usize {
        self.state.lock().map(|s| s.rows_written).unwrap_or(0)
    }
}

impl Sink for CsvSink {
    fn write_header(&self, columns: &[String]) -> Result<()> {
        let mut state = lock(&self.state)?;
        if state.header_written {
            return Err(Error::output("header already written"));
        }
        state.writer.write_record(columns)?;
        state.header_written = true;
        Ok(())
    }

    fn append_rows(&self, rows: &[OutputRow]) -> Result<()> {
        let mut state = lock(&self.state)?;
        if !state.header_written {
            return Err(Error::output("rows appended before header"));
        }
        for row in rows {
            state.writer.write_record(row)?;
        }
        state.rows_written += rows.len();
        debug!(
            "Appended {} rows to {} ({} total)",
            rows.len(),
            self.path.display(),
            state.rows_written
        );
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        lock(&self.state)?.writer.flush()?;
        Ok(())
    }
}
