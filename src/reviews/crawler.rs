//! Review harvesting for one store's products
//!
//! Reviews live on an external timeline API keyed by the store's host
//! name and the product's first-variant SKU. Each product's timeline is
//! paginated independently; the collected reviews are persisted once the
//! traversal for that product ends, including when a non-success status
//! truncates it early. Products without a SKU are skipped.

use crate::catalog::Product;
use crate::config::Config;
use crate::fetch::{Paginator, RetryPolicy};
use crate::reviews::types::{Review, ReviewSource, TimelinePage};
use crate::session::ProgressCounters;
use crate::storage::StorageSink;
use crate::text::normalize;
use crate::Result;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Harvests reviews for the products a catalog crawl accepted
pub struct ReviewCrawler<'a, S: StorageSink> {
    store_key: String,
    client: &'a Client,
    policy: RetryPolicy,
    api_base: String,
    page_size: u32,
    sink: &'a S,
    cancel: CancellationToken,
    progress: &'a ProgressCounters,
}

impl<'a, S: StorageSink> ReviewCrawler<'a, S> {
    /// Creates a review crawler for one store
    ///
    /// The reviews API identifies stores by host name, extracted here
    /// from the store URL.
    pub fn new(
        store_url: &str,
        client: &'a Client,
        config: &Config,
        sink: &'a S,
        cancel: CancellationToken,
        progress: &'a ProgressCounters,
    ) -> Result<Self> {
        let parsed = Url::parse(store_url)?;
        let store_key = parsed
            .host_str()
            .unwrap_or(store_url)
            .trim_start_matches("www.")
            .to_string();

        Ok(Self {
            store_key,
            client,
            policy: RetryPolicy::page_fetch(&config.crawler),
            api_base: config.reviews.api_base.clone(),
            page_size: config.reviews.page_size,
            sink,
            cancel,
            progress,
        })
    }

    /// Harvests and persists reviews for every product with a SKU
    ///
    /// Returns the total number of reviews persisted. A product whose
    /// harvest is interrupted by cancellation is discarded rather than
    /// stored half-collected.
    pub async fn run(&self, products: &[Product]) -> u64 {
        let mut total = 0u64;

        for product in products {
            if self.cancel.is_cancelled() {
                break;
            }

            let sku = match product.first_variant_sku() {
                Some(sku) => sku,
                None => {
                    tracing::debug!("No SKU for '{}', skipping reviews", product.handle);
                    continue;
                }
            };

            let Some(reviews) = self.harvest_timeline(sku).await else {
                break;
            };

            match self.sink.write_reviews(&product.handle, &reviews) {
                Ok(()) => {
                    tracing::info!(
                        "Stored {} reviews for '{}'",
                        reviews.len(),
                        product.handle
                    );
                    self.progress.record_reviews(reviews.len() as u64);
                    total += reviews.len() as u64;
                }
                Err(e) => {
                    tracing::warn!("Failed to store reviews for '{}': {}", product.handle, e);
                }
            }
        }

        total
    }

    /// Paginates the timeline for one SKU
    ///
    /// Returns `None` only when cancellation interrupts the traversal;
    /// an HTTP error or exhausted retries end the traversal normally
    /// with whatever was collected so far.
    async fn harvest_timeline(&self, sku: &str) -> Option<Vec<Review>> {
        let mut reviews = Vec::new();
        let mut pages = Paginator::new(
            self.client,
            &self.policy,
            |page| self.timeline_url(sku, page),
            |body: TimelinePage| body.timeline,
        );

        while let Some(batch) = pages.next_batch().await {
            reviews.extend(
                batch
                    .into_iter()
                    .filter_map(|entry| entry.source)
                    .map(build_review),
            );
            if self.cancel.is_cancelled() {
                return None;
            }
        }

        Some(reviews)
    }

    fn timeline_url(&self, sku: &str, page: u32) -> String {
        format!(
            "{}?type=product_review&store={}&sku={}&sort=date_desc&include_sentiment_analysis=true&page={}&per_page={}",
            self.api_base, self.store_key, sku, page, self.page_size
        )
    }
}

/// Builds a stored review from a raw timeline source
///
/// Author, comments and product name are normalized; the remaining
/// fields pass through verbatim.
fn build_review(source: ReviewSource) -> Review {
    Review {
        author: source.author.map(|a| normalize(&a)),
        rating: source.rating,
        comments: source.comments.map(|c| normalize(&c)),
        product_name: source.product_name.map(|n| normalize(&n)),
        date_created: source.date_created,
        sku: source.sku,
        order_id: source.order_id,
        source: source.source,
    }
}
