//! HTTP client module
//!
//! Provides the Datadog Logs client and the shared request rate limiter.
//!
//! # Features
//!
//! - **Logs Search**: cursor-paginated `events/search` requests
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Explicit Credentials**: keys are passed in, never read from globals

mod client;
mod rate_limit;

pub use client::{Credentials, LogsClient, LogsClientConfig, DEFAULT_SITE};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
