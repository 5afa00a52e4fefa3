use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Checks that retry bounds are at least one attempt, page sizes are
/// positive, output paths are non-empty, and the reviews API base is a
/// well-formed absolute URL.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.crawler.fetch_retries == 0 {
        return Err(ConfigError::Validation(
            "fetch-retries must be at least 1".to_string(),
        ));
    }

    if config.crawler.enrichment_retries == 0 {
        return Err(ConfigError::Validation(
            "enrichment-retries must be at least 1".to_string(),
        ));
    }

    if config.crawler.collections_page_limit == 0 || config.crawler.collections_page_limit > 250 {
        return Err(ConfigError::Validation(
            "collections-page-limit must be between 1 and 250".to_string(),
        ));
    }

    if config.reviews.page_size == 0 {
        return Err(ConfigError::Validation(
            "reviews page-size must be at least 1".to_string(),
        ));
    }

    if config.output.root_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output root-path must not be empty".to_string(),
        ));
    }

    if config.output.index_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output index-path must not be empty".to_string(),
        ));
    }

    if config.user_agent.crawler_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name must not be empty".to_string(),
        ));
    }

    if Url::parse(&config.reviews.api_base).is_err() {
        return Err(ConfigError::InvalidUrl(config.reviews.api_base.clone()));
    }

    Ok(())
}
