//! The persisted dedup index
//!
//! Maps product handles to their titles. The index is loaded once per
//! process, shared across all store sessions, and saved after every
//! accepted product so that an interrupted run resumes without
//! re-fetching finished products.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::storage::{write_json_atomic, StorageResult};

/// The dedup index shared by all concurrently running store sessions
pub type SharedIndex = Arc<Mutex<DedupIndex>>;

/// On-disk shape of the index file
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    #[serde(rename = "config-hash", default)]
    config_hash: String,
    #[serde(rename = "updated-at", default)]
    updated_at: String,
    #[serde(default)]
    products: HashMap<String, String>,
}

/// Handle-to-title map persisted across runs
#[derive(Debug)]
pub struct DedupIndex {
    path: PathBuf,
    config_hash: String,
    entries: HashMap<String, String>,
}

impl DedupIndex {
    /// Creates an empty index, ignoring any existing file
    ///
    /// The file on disk is not touched until the first save.
    pub fn empty(path: impl Into<PathBuf>, config_hash: &str) -> Self {
        Self {
            path: path.into(),
            config_hash: config_hash.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Loads the index from disk
    ///
    /// A missing file yields an empty index (first run). A file that
    /// fails to parse is logged and treated as empty rather than
    /// aborting the run; the next save replaces it.
    pub fn load(path: impl Into<PathBuf>, config_hash: &str) -> Self {
        let path = path.into();

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<IndexFile>(&raw) {
                Ok(file) => {
                    tracing::info!(
                        "Loaded dedup index with {} entries from {}",
                        file.products.len(),
                        path.display()
                    );
                    file.products
                }
                Err(e) => {
                    tracing::warn!(
                        "Dedup index at {} is unreadable, starting empty: {}",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No dedup index at {}, starting empty", path.display());
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read dedup index at {}, starting empty: {}",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        };

        Self {
            path,
            config_hash: config_hash.to_string(),
            entries,
        }
    }

    /// Whether a handle is already known
    pub fn contains(&self, handle: &str) -> bool {
        self.entries.contains_key(handle)
    }

    /// Records a handle with its title
    ///
    /// Inserting an already-known handle overwrites the stored title.
    pub fn insert(&mut self, handle: String, title: String) {
        self.entries.insert(handle, title);
    }

    /// Number of known handles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no handles are known
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the index to disk atomically
    ///
    /// The file is written to a temporary sibling and renamed into
    /// place, so a crash mid-save leaves the previous index intact.
    pub fn save(&self) -> StorageResult<()> {
        let file = IndexFile {
            config_hash: self.config_hash.clone(),
            updated_at: chrono::Utc::now().to_rfc3339(),
            products: self.entries.clone(),
        };
        write_json_atomic(&self.path, &file)
    }
}
