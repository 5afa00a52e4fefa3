//! Filesystem storage sink
//!
//! Layout under the configured root:
//!
//! ```text
//! <root>/<handle>/product.json
//! <root>/<handle>/reviews.json
//! ```
//!
//! Every file is written atomically (temporary sibling plus rename), so
//! a crash mid-write never leaves a truncated document behind.

use crate::catalog::Product;
use crate::reviews::Review;
use crate::storage::traits::{StorageError, StorageResult, StorageSink};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Serializes a value as pretty JSON and writes it atomically
///
/// Parent directories are created as needed. The value lands in a
/// `.tmp` sibling first and is renamed over the target, which is atomic
/// on the same filesystem.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let body = serde_json::to_vec_pretty(value)?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, body).map_err(|source| StorageError::Io {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Stores crawl output as JSON files under a root directory
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn product_dir(&self, handle: &str) -> PathBuf {
        self.root.join(handle)
    }
}

impl StorageSink for FsSink {
    fn write_product(&self, product: &Product) -> StorageResult<()> {
        let path = self.product_dir(&product.handle).join("product.json");
        write_json_atomic(&path, product)?;
        tracing::debug!("Stored product at {}", path.display());
        Ok(())
    }

    fn write_reviews(&self, handle: &str, reviews: &[Review]) -> StorageResult<()> {
        let path = self.product_dir(handle).join("reviews.json");
        write_json_atomic(&path, &reviews)?;
        tracing::debug!("Stored {} reviews at {}", reviews.len(), path.display());
        Ok(())
    }
}
