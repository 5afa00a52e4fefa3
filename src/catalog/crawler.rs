//! Catalog crawler - product discovery and persistence for one store
//!
//! The crawl per store proceeds in three steps:
//! 1. Enumerate collection handles from the paginated collections endpoint
//! 2. Paginate each collection's products, skipping handles already in
//!    the dedup index and persisting each new product before the index
//!    learns about it
//! 3. Fall back to the flat products endpoint when the store exposes no
//!    collections at all
//!
//! The dedup index is saved after every accepted product, so an
//! interrupted run loses at most the in-flight product and never
//! re-fetches completed ones.

use crate::catalog::types::{
    ApiProduct, CollectionsPage, EnrichmentPage, EnrichmentProduct, Product, ProductsPage,
};
use crate::config::CrawlerConfig;
use crate::dedup::SharedIndex;
use crate::fetch::{fetch_optional_json, Paginator, RetryPolicy};
use crate::session::ProgressCounters;
use crate::storage::StorageSink;
use crate::text::normalize;
use crate::Result;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

/// Crawls one store's catalog, producing the session's accepted products
pub struct CatalogCrawler<'a, S: StorageSink> {
    store_url: String,
    client: &'a Client,
    page_policy: RetryPolicy,
    enrichment_policy: RetryPolicy,
    collections_page_limit: u32,
    index: SharedIndex,
    sink: &'a S,
    cancel: CancellationToken,
    progress: &'a ProgressCounters,
}

impl<'a, S: StorageSink> CatalogCrawler<'a, S> {
    /// Creates a crawler for one store
    ///
    /// # Arguments
    ///
    /// * `store_url` - Base URL of the store (trailing slash tolerated)
    /// * `client` - The session's HTTP client
    /// * `config` - Crawler configuration (retry schedules, page limit)
    /// * `index` - The process-wide dedup index
    /// * `sink` - Storage sink receiving product documents
    /// * `cancel` - Token that halts further pagination when triggered
    /// * `progress` - Counters feeding the progress aggregator
    pub fn new(
        store_url: &str,
        client: &'a Client,
        config: &CrawlerConfig,
        index: SharedIndex,
        sink: &'a S,
        cancel: CancellationToken,
        progress: &'a ProgressCounters,
    ) -> Self {
        Self {
            store_url: store_url.trim_end_matches('/').to_string(),
            client,
            page_policy: RetryPolicy::page_fetch(config),
            enrichment_policy: RetryPolicy::enrichment(config),
            collections_page_limit: config.collections_page_limit,
            index,
            sink,
            cancel,
            progress,
        }
    }

    /// Runs the catalog crawl to completion
    ///
    /// Returns the products accepted in this session (duplicates skipped
    /// via the index are not included). The dedup index is persisted
    /// once more at the end; this is idempotent since it is already
    /// current from the per-product saves.
    pub async fn run(&self) -> Result<Vec<Product>> {
        let mut accepted = Vec::new();

        let collections = self.collect_collection_handles().await;
        tracing::info!(
            "Total collections found: {} in {}",
            collections.len(),
            self.store_url
        );

        if collections.is_empty() {
            self.harvest_flat_products(&mut accepted).await;
        } else {
            for handle in &collections {
                if self.cancel.is_cancelled() {
                    break;
                }
                self.harvest_collection(handle, &mut accepted).await;
            }
        }

        // Guards against index entries added outside the main loop
        let index = self.index.lock().unwrap();
        if let Err(e) = index.save() {
            tracing::warn!("Failed to persist dedup index: {}", e);
        }

        Ok(accepted)
    }

    /// Paginates the collections endpoint, accumulating collection handles
    async fn collect_collection_handles(&self) -> Vec<String> {
        let mut handles = Vec::new();
        let mut pages = Paginator::new(
            self.client,
            &self.page_policy,
            |page| {
                format!(
                    "{}/collections.json?page={}&limit={}",
                    self.store_url, page, self.collections_page_limit
                )
            },
            |body: CollectionsPage| body.collections,
        );

        while let Some(batch) = pages.next_batch().await {
            tracing::info!(
                "Found {} collections on page {} in {}",
                batch.len(),
                pages.current_page() - 1,
                self.store_url
            );
            handles.extend(batch.into_iter().filter_map(|c| c.handle));
            if self.cancel.is_cancelled() {
                break;
            }
        }

        handles
    }

    /// Paginates one collection's products endpoint
    async fn harvest_collection(&self, collection_handle: &str, accepted: &mut Vec<Product>) {
        let mut pages = Paginator::new(
            self.client,
            &self.page_policy,
            |page| {
                format!(
                    "{}/collections/{}/products.json?page={}",
                    self.store_url, collection_handle, page
                )
            },
            |body: ProductsPage| body.products,
        );

        while let Some(batch) = pages.next_batch().await {
            let page = pages.current_page() - 1;
            for item in batch {
                self.process_item(item, accepted).await;
            }
            tracing::info!("Scraped page {} of collection '{}'", page, collection_handle);
            if self.cancel.is_cancelled() {
                break;
            }
        }
    }

    /// Paginates the flat products endpoint, used when no collections exist
    async fn harvest_flat_products(&self, accepted: &mut Vec<Product>) {
        let mut pages = Paginator::new(
            self.client,
            &self.page_policy,
            |page| format!("{}/products.json?page={}", self.store_url, page),
            |body: ProductsPage| body.products,
        );

        while let Some(batch) = pages.next_batch().await {
            let page = pages.current_page() - 1;
            for item in batch {
                self.process_item(item, accepted).await;
            }
            tracing::info!("Scraped page {} from {}/products.json", page, self.store_url);
            if self.cancel.is_cancelled() {
                break;
            }
        }
    }

    /// Handles a single product item from a catalog page
    ///
    /// Skips duplicates via the dedup index. For a new product: builds
    /// the normalized record, attempts enrichment, persists the record,
    /// then inserts it into the index and persists the index. The index
    /// only learns a handle after its document write succeeded, so a
    /// failed write leaves the product eligible for a later run.
    async fn process_item(&self, item: ApiProduct, accepted: &mut Vec<Product>) {
        let handle = match item.handle.as_deref() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => {
                tracing::debug!("Discarding product without handle from {}", self.store_url);
                return;
            }
        };

        if self.index.lock().unwrap().contains(&handle) {
            tracing::info!("Duplicate found: {}", handle);
            return;
        }

        let mut product = build_product(item, handle);

        if let Some(extra) = self.fetch_enrichment(&product.handle).await {
            merge_enrichment(&mut product, extra);
        }

        if let Err(e) = self.sink.write_product(&product) {
            tracing::warn!("Failed to store product '{}': {}", product.handle, e);
            return;
        }

        {
            let mut index = self.index.lock().unwrap();
            index.insert(product.handle.clone(), product.title.clone());
            if let Err(e) = index.save() {
                tracing::warn!("Failed to persist dedup index: {}", e);
            }
        }

        self.progress.record_product();
        accepted.push(product);
    }

    /// Fetches supplementary variant/image data for one product
    ///
    /// Exhausted retries or an absent `product` field yield `None`; the
    /// product is stored without enrichment in that case.
    async fn fetch_enrichment(&self, handle: &str) -> Option<EnrichmentProduct> {
        let url = format!("{}/products/{}/reviews.json", self.store_url, handle);
        fetch_optional_json::<EnrichmentPage>(self.client, &url, &self.enrichment_policy)
            .await
            .and_then(|page| page.product)
    }
}

/// Builds a product record from a raw catalog item
///
/// All free-text fields are normalized; the price comes from the first
/// variant when one exists.
fn build_product(item: ApiProduct, handle: String) -> Product {
    let price = item.variants.first().and_then(|v| v.price.clone());

    Product {
        handle,
        title: normalize(item.title.as_deref().unwrap_or_default()),
        vendor: normalize(item.vendor.as_deref().unwrap_or_default()),
        product_type: normalize(item.product_type.as_deref().unwrap_or_default()),
        tags: item.tags.iter().map(|tag| normalize(tag)).collect(),
        price,
        description: normalize(item.body_html.as_deref().unwrap_or_default()),
        created_at: item.created_at,
        updated_at: item.updated_at,
        variants: item.variants,
        images: item.images,
        weight: None,
        inventory_quantity: None,
        compare_at_price: None,
    }
}

/// Merges supplementary data into an already-built product record
///
/// The enrichment variants replace the catalog variants, the first
/// enrichment variant contributes the top-level weight, inventory and
/// compare-at price, and the enrichment images (src and alt normalized)
/// replace the catalog images.
fn merge_enrichment(product: &mut Product, extra: EnrichmentProduct) {
    if let Some(first) = extra.variants.first() {
        product.weight = first.weight;
        product.inventory_quantity = first.inventory_quantity;
        product.compare_at_price = first.compare_at_price.clone();
    }

    product.images = extra
        .images
        .into_iter()
        .map(|mut image| {
            image.src = image.src.map(|src| normalize(&src));
            image.alt = image.alt.map(|alt| normalize(&alt));
            image
        })
        .collect();

    product.variants = extra.variants;
}
