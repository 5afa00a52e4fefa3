//! The storage abstraction products and reviews are written through

use crate::catalog::Product;
use crate::reviews::Review;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from persisting crawl output
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Receives the documents a crawl produces
///
/// A sink write failing for one product never aborts the session; the
/// caller logs the error and moves on, leaving the product eligible for
/// a later run.
pub trait StorageSink: Send + Sync {
    /// Persists one product document
    fn write_product(&self, product: &Product) -> StorageResult<()>;

    /// Persists the collected reviews for one product
    fn write_reviews(&self, handle: &str, reviews: &[Review]) -> StorageResult<()>;
}
