//! Pagination module
//!
//! Cursor-following retrieval of a paginated, time-filtered source.
//!
//! # Overview
//!
//! - `PageSource` - the page-fetch capability (implemented by `LogsClient`)
//! - `CursorLoop` - fetches pages until the source stops returning a cursor
//! - `FetchSettings` - page size, pacing, record cap and rate limiter
//! - `MemorySource` - static record set served with offset cursors

mod cursor;
mod memory;
mod types;

pub use cursor::CursorLoop;
pub use memory::MemorySource;
pub use types::{FetchSettings, PageSource, PaginationState, DEFAULT_PAGE_SIZE};

#[cfg(test)]
mod tests;
