//! Cross-run product deduplication

mod index;

pub use index::{DedupIndex, SharedIndex};
