//! HTTP fetching: client construction, retry schedules, pagination
//!
//! This module handles all network access for the crawler:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - Retry-with-backoff for transient connection failures
//! - The generic page-by-page pagination traversal

mod client;
mod paginate;
mod retry;

pub use client::build_http_client;
pub use paginate::Paginator;
pub use retry::{fetch_json, fetch_optional_json, Backoff, FetchOutcome, RetryPolicy};
