//! Cursor fetch loop
//!
//! Follows continuation tokens for one filter until the source stops
//! returning them. Each caller owns its own loop; nothing is shared between
//! loops except the optional rate limiter.

use super::types::{FetchSettings, PageSource, PaginationState};
use crate::error::Result;
use crate::types::{FilterSpec, Record};
use tracing::{debug, info};

/// Pull-based iterator over the pages of one filter
pub struct CursorLoop<'a> {
    source: &'a dyn PageSource,
    filter: FilterSpec,
    settings: FetchSettings,
    state: PaginationState,
}

impl<'a> CursorLoop<'a> {
    /// Create a loop starting before the first page
    pub fn new(source: &'a dyn PageSource, filter: FilterSpec, settings: FetchSettings) -> Self {
        Self {
            source,
            filter,
            settings,
            state: PaginationState::new(),
        }
    }

    /// Current progress
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// The filter this loop fetches
    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Fetch the next page of records, or `None` once the range is exhausted.
    ///
    /// Terminates only when the source stops returning a cursor (or the
    /// record cap is reached).
    pub async fn next_page(&mut self) -> Result<Option<Vec<Record>>> {
        if self.state.done {
            return Ok(None);
        }

        let remaining = self
            .settings
            .max_records
            .map(|max| max.saturating_sub(self.state.records_fetched));
        if remaining == Some(0) {
            self.state.mark_done();
            return Ok(None);
        }

        if !self.settings.pacing_delay.is_zero() {
            tokio::time::sleep(self.settings.pacing_delay).await;
        }
        if let Some(limiter) = &self.settings.rate_limiter {
            limiter.wait().await;
        }

        debug!(
            from = self.filter.from,
            to = self.filter.to,
            cursor = self.state.cursor.as_deref().unwrap_or("-"),
            "Fetching page"
        );
        let page = self
            .source
            .fetch(
                &self.filter,
                self.state.cursor.as_deref(),
                self.settings.page_size,
            )
            .await?;

        let mut records = page.records;
        let capped = remaining.is_some_and(|remaining| records.len() >= remaining);
        if let Some(remaining) = remaining {
            records.truncate(remaining);
        }
        self.state.add_page(records.len());

        info!(
            "Found records => {} for window {} - {}",
            records.len(),
            self.filter.from,
            self.filter.to
        );

        match page.next_cursor {
            Some(cursor) if !cursor.is_empty() && !capped => self.state.set_cursor(cursor),
            _ => self.state.mark_done(),
        }

        Ok(Some(records))
    }
}
