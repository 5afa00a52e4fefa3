//! Persistence of crawl output

mod fs;
mod traits;

pub use fs::{write_json_atomic, FsSink};
pub use traits::{StorageError, StorageResult, StorageSink};
