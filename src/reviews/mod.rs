//! Review harvesting from the external timeline API

mod crawler;
mod types;

pub use crawler::ReviewCrawler;
pub use types::{Review, ReviewSource, TimelineEntry, TimelinePage};
