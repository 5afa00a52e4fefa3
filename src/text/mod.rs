//! Text normalization for free-text catalog fields
//!
//! Every free-text value harvested from the catalog or reviews APIs runs
//! through [`normalize`] before storage: HTML fragments become plain
//! text, entities are decoded, and whitespace is collapsed. URL and
//! file-path inputs pass through untouched.

mod normalizer;

pub use normalizer::{normalize, normalize_with_links};
