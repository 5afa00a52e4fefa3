//! Shopsweep main entry point
//!
//! Command-line interface for the Shopsweep catalog and reviews
//! harvester.

use anyhow::Context;
use clap::Parser;
use shopsweep::config::{load_config_with_hash, Config};
use shopsweep::session::Orchestrator;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Shopsweep: a storefront catalog and reviews harvester
///
/// Shopsweep crawls storefronts exposing the standard JSON catalog API,
/// stores one cleaned product document per handle alongside the
/// product's customer reviews, and skips products already harvested in
/// earlier runs.
#[derive(Parser, Debug)]
#[command(name = "shopsweep")]
#[command(version)]
#[command(about = "A storefront catalog and reviews harvester", long_about = None)]
struct Cli {
    /// Store URLs to crawl
    #[arg(value_name = "STORE_URL")]
    stores: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "shopsweep.toml")]
    config: PathBuf,

    /// File with one store URL per line (blank lines and # comments ignored)
    #[arg(long, value_name = "PATH")]
    stores_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore the existing dedup index and harvest everything again
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(&cli.config)?;

    let mut stores = cli.stores.clone();
    if let Some(path) = &cli.stores_file {
        stores.extend(
            read_stores_file(path)
                .with_context(|| format!("reading store list from {}", path.display()))?,
        );
    }
    if stores.is_empty() {
        tracing::error!("No store URLs given (pass them as arguments or via --stores-file)");
        std::process::exit(2);
    }

    if cli.dry_run {
        print_dry_run(&config, &stores);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing in-flight work");
            signal_cancel.cancel();
        }
    });

    let orchestrator = Orchestrator::new(config, config_hash, cli.fresh, cancel.clone());
    let reports = orchestrator.run(stores).await?;

    let products: u64 = reports.iter().map(|r| r.products).sum();
    let reviews: u64 = reports.iter().map(|r| r.reviews).sum();
    if cancel.is_cancelled() {
        tracing::info!("Run interrupted; progress is saved and the next run resumes");
    }
    tracing::info!(
        "Run complete: {} stores, {} new products, {} reviews",
        reports.len(),
        products,
        reviews
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shopsweep=info,warn"),
            1 => EnvFilter::new("shopsweep=debug,info"),
            2 => EnvFilter::new("shopsweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration, falling back to defaults when no file exists
fn load_configuration(path: &Path) -> anyhow::Result<(Config, String)> {
    if path.exists() {
        tracing::info!("Loading configuration from: {}", path.display());
        match load_config_with_hash(path) {
            Ok((config, hash)) => {
                tracing::info!("Configuration loaded successfully (hash: {})", hash);
                Ok((config, hash))
            }
            Err(e) => {
                tracing::error!("Failed to load configuration: {}", e);
                Err(e.into())
            }
        }
    } else {
        tracing::info!(
            "No configuration file at {}, using defaults",
            path.display()
        );
        Ok((Config::default(), compute_default_hash()))
    }
}

/// The hash recorded in the index when running on built-in defaults
fn compute_default_hash() -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(b""))
}

/// Reads store URLs from a file, one per line
///
/// Blank lines and lines starting with `#` are skipped.
fn read_stores_file(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Prints the --dry-run report
fn print_dry_run(config: &Config, stores: &[String]) {
    println!("=== Shopsweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Fetch retries: {}", config.crawler.fetch_retries);
    println!(
        "  Fetch retry delay: {}ms (doubling)",
        config.crawler.fetch_retry_delay_ms
    );
    println!(
        "  Enrichment retries: {}",
        config.crawler.enrichment_retries
    );
    println!(
        "  Enrichment retry delay: {}ms (constant)",
        config.crawler.enrichment_retry_delay_ms
    );
    println!(
        "  Collections page limit: {}",
        config.crawler.collections_page_limit
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);

    println!("\nOutput:");
    println!("  Products: {}", config.output.root_path);
    println!("  Dedup index: {}", config.output.index_path);

    println!("\nReviews API:");
    println!("  Endpoint: {}", config.reviews.api_base);
    println!("  Page size: {}", config.reviews.page_size);

    println!("\nStores ({}):", stores.len());
    for store in stores {
        println!("  - {}", store);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} stores", stores.len());
}
