//! Retry policies and retry-wrapped JSON fetches
//!
//! Two schedules exist:
//! - the generic page fetch: few attempts, short base delay that doubles
//!   each attempt
//! - the enrichment fetch: more attempts, constant delay, and a `None`
//!   result on exhaustion instead of an error, so a product is stored
//!   even when its supplementary data never arrives

use crate::config::CrawlerConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// How the inter-attempt delay evolves across retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failed attempt
    Fixed,
    /// Delay doubles after each failed attempt
    Exponential,
}

/// A bounded retry schedule for transient network failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Schedule for generic page fetches: delay doubles each attempt
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff: Backoff::Exponential,
        }
    }

    /// Schedule with a constant inter-attempt delay
    pub fn fixed(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff: Backoff::Fixed,
        }
    }

    /// The page-fetch schedule from the crawler configuration
    pub fn page_fetch(config: &CrawlerConfig) -> Self {
        Self::exponential(
            config.fetch_retries,
            Duration::from_millis(config.fetch_retry_delay_ms),
        )
    }

    /// The enrichment-fetch schedule from the crawler configuration
    pub fn enrichment(config: &CrawlerConfig) -> Self {
        Self::fixed(
            config.enrichment_retries,
            Duration::from_millis(config.enrichment_retry_delay_ms),
        )
    }

    /// Delay to sleep after the failed attempt with the given zero-based index
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Exponential => self.base_delay * 2u32.saturating_pow(attempt),
        }
    }

    /// The full delay schedule, one entry per attempt
    pub fn delay_schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts).map(|a| self.delay_for(a)).collect()
    }
}

/// Outcome of a retry-wrapped page fetch
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// HTTP success with a decoded body
    Body(T),
    /// HTTP non-success status; not retried, the caller decides what it means
    Status(u16),
    /// Transient failures exhausted the retry budget, or the body was malformed
    Failed,
}

/// Fetches a URL and decodes its JSON body, retrying transient failures
///
/// Connection-level failures (refused connections, timeouts) are retried
/// per the policy. A non-success HTTP status is returned immediately
/// without retrying: for pagination traversals it marks the end of the
/// traversal, not an error. A body that fails to decode is logged and
/// reported as `Failed` so the caller degrades instead of crashing.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> FetchOutcome<T> {
    for attempt in 0..policy.max_attempts {
        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    return FetchOutcome::Status(status.as_u16());
                }
                return match response.json::<T>().await {
                    Ok(body) => FetchOutcome::Body(body),
                    Err(e) => {
                        tracing::warn!("Malformed response body from {}: {}", url, e);
                        FetchOutcome::Failed
                    }
                };
            }
            Err(e) if is_transient(&e) => {
                if attempt + 1 < policy.max_attempts {
                    let delay = policy.delay_for(attempt);
                    tracing::warn!(
                        "Error fetching {}, retrying in {:?} ({}/{}): {}",
                        url,
                        delay,
                        attempt + 1,
                        policy.max_attempts,
                        e
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    tracing::error!(
                        "Failed to fetch {} after {} attempts: {}",
                        url,
                        policy.max_attempts,
                        e
                    );
                }
            }
            Err(e) => {
                tracing::error!("Request to {} failed: {}", url, e);
                return FetchOutcome::Failed;
            }
        }
    }

    FetchOutcome::Failed
}

/// Fetches a single resource, returning `None` instead of an error
///
/// Used for the per-product enrichment endpoint. Connection failures are
/// retried with the policy's constant delay; a non-success status or an
/// exhausted retry budget yields `None`, never a failure that would
/// abort the enclosing product.
pub async fn fetch_optional_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> Option<T> {
    for attempt in 0..policy.max_attempts {
        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    tracing::info!("Failed to retrieve {} (HTTP {})", url, status.as_u16());
                    return None;
                }
                return match response.json::<T>().await {
                    Ok(body) => Some(body),
                    Err(e) => {
                        tracing::warn!("Malformed response body from {}: {}", url, e);
                        None
                    }
                };
            }
            Err(e) if is_transient(&e) => {
                tracing::info!(
                    "Connection error for {}: {}. Attempt {} of {}",
                    url,
                    e,
                    attempt + 1,
                    policy.max_attempts
                );
                if attempt + 1 < policy.max_attempts {
                    tokio::time::sleep(policy.delay_for(attempt)).await;
                }
            }
            Err(e) => {
                tracing::warn!("Request to {} failed: {}", url, e);
                return None;
            }
        }
    }

    tracing::info!(
        "Giving up on {} after {} attempts",
        url,
        policy.max_attempts
    );
    None
}

/// Whether an error is a connection-level failure worth retrying
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}
