use serde::Deserialize;

/// Main configuration structure for Shopsweep
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub reviews: ReviewsConfig,
}

/// Crawler behavior configuration
///
/// The retry delays default to the production values (1s doubling for
/// generic page fetches, constant 5s for enrichment fetches) but are
/// configurable so tests can run with millisecond delays.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Attempts for a generic page fetch before giving up
    #[serde(rename = "fetch-retries", default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Base delay between generic fetch attempts, doubled each attempt (milliseconds)
    #[serde(rename = "fetch-retry-delay-ms", default = "default_fetch_retry_delay_ms")]
    pub fetch_retry_delay_ms: u64,

    /// Attempts for the per-product enrichment fetch before giving up
    #[serde(rename = "enrichment-retries", default = "default_enrichment_retries")]
    pub enrichment_retries: u32,

    /// Constant delay between enrichment fetch attempts (milliseconds)
    #[serde(
        rename = "enrichment-retry-delay-ms",
        default = "default_enrichment_retry_delay_ms"
    )]
    pub enrichment_retry_delay_ms: u64,

    /// Page size requested from the collections endpoint
    #[serde(
        rename = "collections-page-limit",
        default = "default_collections_page_limit"
    )]
    pub collections_page_limit: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            fetch_retries: default_fetch_retries(),
            fetch_retry_delay_ms: default_fetch_retry_delay_ms(),
            enrichment_retries: default_enrichment_retries(),
            enrichment_retry_delay_ms: default_enrichment_retry_delay_ms(),
            collections_page_limit: default_collections_page_limit(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: String::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives one subdirectory per product handle
    #[serde(rename = "root-path", default = "default_root_path")]
    pub root_path: String,

    /// Path of the persisted dedup index document
    #[serde(rename = "index-path", default = "default_index_path")]
    pub index_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            index_path: default_index_path(),
        }
    }
}

/// Reviews API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewsConfig {
    /// Base URL of the reviews timeline endpoint
    #[serde(rename = "api-base", default = "default_reviews_api_base")]
    pub api_base: String,

    /// Reviews requested per page (the provider maximum keeps round trips low)
    #[serde(rename = "page-size", default = "default_reviews_page_size")]
    pub page_size: u32,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            api_base: default_reviews_api_base(),
            page_size: default_reviews_page_size(),
        }
    }
}

fn default_fetch_retries() -> u32 {
    3
}

fn default_fetch_retry_delay_ms() -> u64 {
    1000
}

fn default_enrichment_retries() -> u32 {
    5
}

fn default_enrichment_retry_delay_ms() -> u64 {
    5000
}

fn default_collections_page_limit() -> u32 {
    250
}

fn default_crawler_name() -> String {
    "Shopsweep".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_root_path() -> String {
    "data/products".to_string()
}

fn default_index_path() -> String {
    "data/product_list.json".to_string()
}

fn default_reviews_api_base() -> String {
    "https://api.reviews.io/timeline/data".to_string()
}

fn default_reviews_page_size() -> u32 {
    5000
}
