//! Pagination types and traits
//!
//! Defines the page-fetch capability and the per-loop state.

use crate::error::Result;
use crate::http::RateLimiter;
use crate::types::{FilterSpec, Page};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Default page size for bulk export (the source's maximum)
pub const DEFAULT_PAGE_SIZE: usize = 5000;

/// Anything that can return one page of records for a filter
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page following `cursor` (or the first page when `None`)
    async fn fetch(
        &self,
        filter: &FilterSpec,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<Page>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch(
        &self,
        filter: &FilterSpec,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<Page> {
        (**self).fetch(filter, cursor, page_size).await
    }
}

/// Knobs for one cursor fetch loop
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Records requested per page
    pub page_size: usize,
    /// Fixed delay before every request (zero disables)
    pub pacing_delay: Duration,
    /// Stop after this many records
    pub max_records: Option<usize>,
    /// Shared limiter awaited before every request
    pub rate_limiter: Option<RateLimiter>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pacing_delay: Duration::ZERO,
            max_records: None,
            rate_limiter: None,
        }
    }
}

impl FetchSettings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the fixed pacing delay
    #[must_use]
    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    /// Cap the number of records
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    /// Attach a rate limiter
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }
}

/// Progress of one cursor fetch loop
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Cursor for the next request
    pub cursor: Option<String>,
    /// Pages fetched so far
    pub pages_fetched: usize,
    /// Records fetched so far
    pub records_fetched: usize,
    /// Whether the range is exhausted
    pub done: bool,
}

impl PaginationState {
    /// Create fresh state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fetched page
    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.records_fetched += records;
    }

    /// Set the next cursor
    pub fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }

    /// Mark as done
    pub fn mark_done(&mut self) {
        self.done = true;
        self.cursor = None;
    }
}
