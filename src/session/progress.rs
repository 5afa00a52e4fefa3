//! Session-wide progress counters and the periodic reporter task
//!
//! Crawler components bump atomic counters as they accept products and
//! persist reviews; a background task logs the totals at a fixed
//! interval so long runs stay observable without per-item log volume.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Monotonic counters shared by every store session in a run
#[derive(Debug, Default)]
pub struct ProgressCounters {
    products: AtomicU64,
    reviews: AtomicU64,
}

impl ProgressCounters {
    pub fn record_product(&self) {
        self.products.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reviews(&self, count: u64) {
        self.reviews.fetch_add(count, Ordering::Relaxed);
    }

    pub fn products(&self) -> u64 {
        self.products.load(Ordering::Relaxed)
    }

    pub fn reviews(&self) -> u64 {
        self.reviews.load(Ordering::Relaxed)
    }
}

/// Spawns the periodic progress logger
///
/// The task logs totals every `interval` until the token is cancelled,
/// then emits one final line and exits.
pub fn spawn_reporter(
    progress: Arc<ProgressCounters>,
    cancel: CancellationToken,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tracing::info!(
                        "Progress: {} products, {} reviews",
                        progress.products(),
                        progress.reviews()
                    );
                }
            }
        }

        tracing::info!(
            "Final totals: {} products, {} reviews",
            progress.products(),
            progress.reviews()
        );
    })
}
