//! Catalog crawling: collections, product pages, enrichment, dedup

mod crawler;
mod types;

pub use crawler::CatalogCrawler;
pub use types::{
    ApiProduct, Collection, CollectionsPage, EnrichmentPage, EnrichmentProduct, Image, Product,
    ProductsPage, Variant,
};
