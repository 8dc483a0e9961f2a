//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use crate::http::{RateLimiter, RateLimiterConfig};
use crate::types::{FilterSpec, Page, Record};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Mutex;
use std::time::{Duration, Instant};

fn record_at(ms: i64) -> Record {
    Record::new(Utc.timestamp_millis_opt(ms).unwrap())
}

/// Source replaying a scripted list of responses and recording cursors
struct ScriptedSource {
    responses: Mutex<Vec<Result<Page>>>,
    cursors: Mutex<Vec<Option<String>>>,
}

impl ScriptedSource {
    fn new(mut responses: Vec<Result<Page>>) -> Self {
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            cursors: Mutex::new(Vec::new()),
        }
    }

    fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch(
        &self,
        _filter: &FilterSpec,
        cursor: Option<&str>,
        _page_size: usize,
    ) -> Result<Page> {
        self.cursors.lock().unwrap().push(cursor.map(String::from));
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(Error::Other("script exhausted".to_string())))
    }
}

/// Source that always claims there is more data
struct EndlessSource;

#[async_trait]
impl PageSource for EndlessSource {
    async fn fetch(
        &self,
        _filter: &FilterSpec,
        _cursor: Option<&str>,
        page_size: usize,
    ) -> Result<Page> {
        Ok(Page::with_cursor(
            (0..page_size).map(|i| record_at(i as i64)).collect(),
            "more",
        ))
    }
}

async fn drain(mut cursor_loop: CursorLoop<'_>) -> Result<Vec<usize>> {
    let mut sizes = Vec::new();
    while let Some(records) = cursor_loop.next_page().await? {
        sizes.push(records.len());
    }
    Ok(sizes)
}

// ============================================================================
// FetchSettings / PaginationState Tests
// ============================================================================

#[test]
fn test_fetch_settings_default() {
    let settings = FetchSettings::default();
    assert_eq!(settings.page_size, 5000);
    assert!(settings.pacing_delay.is_zero());
    assert!(settings.max_records.is_none());
    assert!(settings.rate_limiter.is_none());
}

#[test]
fn test_fetch_settings_builder() {
    let settings = FetchSettings::new()
        .with_page_size(10)
        .with_pacing_delay(Duration::from_secs(6))
        .with_max_records(10)
        .with_rate_limiter(RateLimiter::default());

    assert_eq!(settings.page_size, 10);
    assert_eq!(settings.pacing_delay, Duration::from_secs(6));
    assert_eq!(settings.max_records, Some(10));
    assert!(settings.rate_limiter.is_some());
}

#[test]
fn test_pagination_state() {
    let mut state = PaginationState::new();
    state.add_page(5);
    state.set_cursor("abc".to_string());
    assert_eq!(state.pages_fetched, 1);
    assert_eq!(state.records_fetched, 5);
    assert_eq!(state.cursor.as_deref(), Some("abc"));

    state.mark_done();
    assert!(state.done);
    assert!(state.cursor.is_none());
}

// ============================================================================
// CursorLoop Tests
// ============================================================================

#[tokio::test]
async fn test_loop_follows_cursors_until_absent() {
    let source = ScriptedSource::new(vec![
        Ok(Page::with_cursor(vec![record_at(1), record_at(2)], "c1")),
        Ok(Page::with_cursor(vec![record_at(3)], "c2")),
        Ok(Page::last(vec![record_at(4)])),
    ]);

    let cursor_loop = CursorLoop::new(&source, FilterSpec::new("*", 0, 10), FetchSettings::new());
    let sizes = drain(cursor_loop).await.unwrap();

    assert_eq!(sizes, vec![2, 1, 1]);
    assert_eq!(
        source.cursors(),
        vec![None, Some("c1".to_string()), Some("c2".to_string())]
    );
}

#[tokio::test]
async fn test_loop_single_page() {
    let source = ScriptedSource::new(vec![Ok(Page::last(vec![]))]);
    let mut cursor_loop =
        CursorLoop::new(&source, FilterSpec::new("*", 0, 10), FetchSettings::new());

    assert_eq!(cursor_loop.next_page().await.unwrap(), Some(vec![]));
    assert_eq!(cursor_loop.next_page().await.unwrap(), None);
    assert_eq!(cursor_loop.state().pages_fetched, 1);
}

#[tokio::test]
async fn test_loop_empty_cursor_ends() {
    let source = ScriptedSource::new(vec![Ok(Page::with_cursor(vec![record_at(1)], ""))]);
    let cursor_loop = CursorLoop::new(&source, FilterSpec::new("*", 0, 10), FetchSettings::new());
    assert_eq!(drain(cursor_loop).await.unwrap(), vec![1]);
    assert_eq!(source.cursors().len(), 1);
}

#[tokio::test]
async fn test_loop_propagates_transport_error() {
    let source = ScriptedSource::new(vec![
        Ok(Page::with_cursor(vec![record_at(1)], "c1")),
        Err(Error::http_status(403, "Forbidden")),
    ]);
    let mut cursor_loop =
        CursorLoop::new(&source, FilterSpec::new("*", 0, 10), FetchSettings::new());

    assert!(cursor_loop.next_page().await.unwrap().is_some());
    let err = cursor_loop.next_page().await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_loop_max_records_caps_endless_source() {
    let settings = FetchSettings::new().with_page_size(4).with_max_records(10);
    let cursor_loop = CursorLoop::new(&EndlessSource, FilterSpec::new("*", 0, 10), settings);

    assert_eq!(drain(cursor_loop).await.unwrap(), vec![4, 4, 2]);
}

#[tokio::test]
async fn test_loop_max_records_on_page_boundary() {
    let settings = FetchSettings::new().with_page_size(5).with_max_records(10);
    let mut cursor_loop = CursorLoop::new(&EndlessSource, FilterSpec::new("*", 0, 10), settings);

    assert_eq!(cursor_loop.next_page().await.unwrap().map(|r| r.len()), Some(5));
    assert_eq!(cursor_loop.next_page().await.unwrap().map(|r| r.len()), Some(5));
    assert_eq!(cursor_loop.next_page().await.unwrap(), None);
    assert_eq!(cursor_loop.state().pages_fetched, 2);
}

#[tokio::test(start_paused = true)]
async fn test_loop_pacing_delay() {
    let source = ScriptedSource::new(vec![
        Ok(Page::with_cursor(vec![], "c1")),
        Ok(Page::last(vec![])),
    ]);
    let settings = FetchSettings::new().with_pacing_delay(Duration::from_secs(6));
    let start = tokio::time::Instant::now();

    drain(CursorLoop::new(&source, FilterSpec::new("*", 0, 10), settings))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(12));
}

#[tokio::test]
async fn test_loop_waits_for_rate_limiter() {
    let source = ScriptedSource::new(vec![
        Ok(Page::with_cursor(vec![], "c1")),
        Ok(Page::with_cursor(vec![], "c2")),
        Ok(Page::last(vec![])),
    ]);
    // One request per 100ms, no burst beyond the first.
    let limiter = RateLimiter::new(&RateLimiterConfig::new(1, Duration::from_millis(100)));
    let settings = FetchSettings::new().with_rate_limiter(limiter);
    let start = Instant::now();

    drain(CursorLoop::new(&source, FilterSpec::new("*", 0, 10), settings))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(180));
}

// ============================================================================
// MemorySource Tests
// ============================================================================

#[tokio::test]
async fn test_memory_source_pages_by_offset() {
    let source = MemorySource::new((0..5).map(record_at).collect());
    let settings = FetchSettings::new().with_page_size(2);

    let sizes = drain(CursorLoop::new(&source, FilterSpec::new("*", 0, 100), settings))
        .await
        .unwrap();

    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(source.requests(), 3);
}

#[tokio::test]
async fn test_memory_source_filters_half_open_range() {
    let source = MemorySource::new(vec![record_at(9), record_at(10), record_at(19), record_at(20)]);
    let page = source
        .fetch(&FilterSpec::new("*", 10, 20), None, 100)
        .await
        .unwrap();

    let times: Vec<i64> = page
        .records
        .iter()
        .map(|r| r.timestamp.timestamp_millis())
        .collect();
    assert_eq!(times, vec![10, 19]);
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_memory_source_rejects_bad_cursor() {
    let source = MemorySource::new(vec![]);
    let err = source
        .fetch(&FilterSpec::new("*", 0, 1), Some("abc"), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 400, .. }));
}
