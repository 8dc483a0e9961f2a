//! In-memory page source
//!
//! Serves a fixed set of records with offset cursors. Used for offline
//! replays and for exercising the fetch engine without a network.

use super::types::PageSource;
use crate::error::{Error, Result};
use crate::types::{FilterSpec, Page, Record};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Page source over a static record set, filtered by timestamp `[from, to)`
#[derive(Debug, Default)]
pub struct MemorySource {
    records: Vec<Record>,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemorySource {
    /// Create a source over `records`, sorted by timestamp
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self {
            records,
            ..Self::default()
        }
    }

    /// Number of `fetch` calls served
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent `fetch` calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for MemorySource {
    async fn fetch(
        &self,
        filter: &FilterSpec,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<Page> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let offset = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| Error::http_status(400, format!("invalid cursor '{c}'")))?,
            None => 0,
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Give sibling fetches a chance to overlap.
        tokio::task::yield_now().await;

        let matching: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| {
                let ts = r.timestamp.timestamp_millis();
                ts >= filter.from && ts < filter.to
            })
            .collect();

        let end = (offset + page_size.max(1)).min(matching.len());
        let records = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|r| (*r).clone())
            .collect();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(if end < matching.len() {
            Page::with_cursor(records, end.to_string())
        } else {
            Page::last(records)
        })
    }
}
