//! Runs the crawl across all requested stores
//!
//! Each store runs as its own tokio task against a shared dedup index.
//! One store failing is logged and never aborts the others; the run
//! finishes with a report per completed store.

use crate::catalog::CatalogCrawler;
use crate::config::Config;
use crate::dedup::{DedupIndex, SharedIndex};
use crate::fetch::build_http_client;
use crate::reviews::ReviewCrawler;
use crate::session::progress::{spawn_reporter, ProgressCounters};
use crate::storage::FsSink;
use crate::{Result, SweepError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(30);

/// Outcome of one completed store session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub store: String,
    pub products: u64,
    pub reviews: u64,
}

/// Coordinates store sessions, the shared dedup index and progress
pub struct Orchestrator {
    config: Config,
    config_hash: String,
    fresh: bool,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Creates an orchestrator for one run
    ///
    /// # Arguments
    ///
    /// * `config` - The validated run configuration
    /// * `config_hash` - Hash of the raw config, recorded in the index
    /// * `fresh` - When true, the existing dedup index is ignored
    /// * `cancel` - Token that winds the whole run down when triggered
    pub fn new(config: Config, config_hash: String, fresh: bool, cancel: CancellationToken) -> Self {
        Self {
            config,
            config_hash,
            fresh,
            cancel,
        }
    }

    /// Crawls every store and returns a report per completed session
    ///
    /// The dedup index is loaded once and shared, so a product seen by
    /// one store task is skipped by every other. Failed sessions are
    /// logged and omitted from the returned reports.
    pub async fn run(&self, stores: Vec<String>) -> Result<Vec<SessionReport>> {
        let index = if self.fresh {
            tracing::info!("Ignoring existing dedup index (fresh run)");
            DedupIndex::empty(&self.config.output.index_path, &self.config_hash)
        } else {
            DedupIndex::load(&self.config.output.index_path, &self.config_hash)
        };
        let index: SharedIndex = Arc::new(Mutex::new(index));

        let progress = Arc::new(ProgressCounters::default());
        let reporter_cancel = CancellationToken::new();
        let reporter = spawn_reporter(
            Arc::clone(&progress),
            reporter_cancel.clone(),
            PROGRESS_INTERVAL,
        );

        let mut handles = Vec::with_capacity(stores.len());
        for store in stores {
            let task = run_session(
                store.clone(),
                self.config.clone(),
                Arc::clone(&index),
                Arc::clone(&progress),
                self.cancel.clone(),
            );
            handles.push((store, tokio::spawn(task)));
        }

        let mut reports = Vec::new();
        for (store, handle) in handles {
            match handle.await {
                Ok(Ok(report)) => {
                    tracing::info!(
                        "Finished {}: {} products, {} reviews",
                        report.store,
                        report.products,
                        report.reviews
                    );
                    reports.push(report);
                }
                Ok(Err(e)) => {
                    tracing::error!("Store {} failed: {}", store, e);
                }
                Err(e) => {
                    let err = SweepError::Session {
                        store: store.clone(),
                        message: e.to_string(),
                    };
                    tracing::error!("{}", err);
                }
            }
        }

        reporter_cancel.cancel();
        let _ = reporter.await;

        Ok(reports)
    }
}

/// Crawls a single store: catalog first, then reviews for its products
async fn run_session(
    store: String,
    config: Config,
    index: SharedIndex,
    progress: Arc<ProgressCounters>,
    cancel: CancellationToken,
) -> Result<SessionReport> {
    let store_url = store.trim_end_matches('/').to_string();
    tracing::info!("Starting session for {}", store_url);

    let client = build_http_client(&config.user_agent)?;
    let sink = FsSink::new(&config.output.root_path);

    let catalog = CatalogCrawler::new(
        &store_url,
        &client,
        &config.crawler,
        index,
        &sink,
        cancel.clone(),
        &progress,
    );
    let products = catalog.run().await?;

    let reviews = ReviewCrawler::new(&store_url, &client, &config, &sink, cancel, &progress)?
        .run(&products)
        .await;

    Ok(SessionReport {
        store: store_url,
        products: products.len() as u64,
        reviews,
    })
}
