//! Full-run tests: mock storefront and reviews API, real orchestrator
//!
//! Each test wires a wiremock server serving the catalog endpoints (and
//! the reviews timeline under the same host), points the configuration
//! at a temporary output directory, and runs the orchestrator the way
//! the binary would.

use shopsweep::catalog::Product;
use shopsweep::config::Config;
use shopsweep::reviews::Review;
use shopsweep::session::Orchestrator;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(dir: &TempDir, server: &MockServer) -> Config {
    let mut config = Config::default();
    config.crawler.fetch_retry_delay_ms = 1;
    config.crawler.enrichment_retries = 1;
    config.crawler.enrichment_retry_delay_ms = 1;
    config.output.root_path = dir.path().join("products").display().to_string();
    config.output.index_path = dir.path().join("product_list.json").display().to_string();
    config.reviews.api_base = format!("{}/timeline/data", server.uri());
    config
}

fn read_product(root: &Path, handle: &str) -> Product {
    let raw = std::fs::read_to_string(root.join("products").join(handle).join("product.json"))
        .unwrap_or_else(|_| panic!("missing product.json for {}", handle));
    serde_json::from_str(&raw).unwrap()
}

fn read_reviews(root: &Path, handle: &str) -> Vec<Review> {
    let raw = std::fs::read_to_string(root.join("products").join(handle).join("reviews.json"))
        .unwrap_or_else(|_| panic!("missing reviews.json for {}", handle));
    serde_json::from_str(&raw).unwrap()
}

/// Mounts a one-collection store with two products and one review
async fn mount_sale_store(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/collections.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "collections": [{"handle": "sale"}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "collections": []
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/collections/sale/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": [
                {
                    "handle": "shirt",
                    "title": "Linen <b>Shirt</b>",
                    "vendor": "Acme &amp; Co",
                    "product_type": "Shirts",
                    "tags": ["summer"],
                    "body_html": "<p>Soft  linen.</p>",
                    "variants": [{"price": "19.99", "sku": "SKU1"}]
                },
                {
                    "handle": "hat",
                    "title": "Straw Hat",
                    "body_html": "<p>Wide brim.</p>",
                    "variants": []
                }
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/sale/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": []
        })))
        .mount(server)
        .await;

    // Supplementary data exists for the shirt only
    Mock::given(method("GET"))
        .and(path("/products/shirt/reviews.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "product": {
                "variants": [{
                    "price": "19.99",
                    "sku": "SKU1",
                    "weight": 0.3,
                    "inventory_quantity": 12,
                    "compare_at_price": "24.99"
                }],
                "images": [{"src": "https://cdn.example.com/shirt.jpg", "alt": "front"}]
            }
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/hat/reviews.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    // One review for the shirt's SKU; page 2 ends the timeline
    Mock::given(method("GET"))
        .and(path("/timeline/data"))
        .and(query_param("sku", "SKU1"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "timeline": [
                {"_source": {
                    "author": "Sam",
                    "rating": 5,
                    "comments": "Fits  perfectly.",
                    "product_name": "Linen <b>Shirt</b>",
                    "date_created": "2024-03-01",
                    "sku": "SKU1",
                    "source": "organic"
                }}
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/timeline/data"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "timeline": []
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_of_one_store() {
    let server = MockServer::start().await;
    mount_sale_store(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);
    let orchestrator = Orchestrator::new(
        config,
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );

    let reports = orchestrator.run(vec![server.uri()]).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].products, 2);
    assert_eq!(reports[0].reviews, 1);

    // Product documents are cleaned and enriched
    let shirt = read_product(dir.path(), "shirt");
    assert_eq!(shirt.title, "Linen Shirt");
    assert_eq!(shirt.vendor, "Acme & Co");
    assert_eq!(shirt.description, "Soft linen.");
    assert_eq!(shirt.price.as_deref(), Some("19.99"));
    assert_eq!(shirt.weight, Some(0.3));
    assert_eq!(shirt.inventory_quantity, Some(12));
    assert_eq!(shirt.compare_at_price.as_deref(), Some("24.99"));

    let hat = read_product(dir.path(), "hat");
    assert_eq!(hat.title, "Straw Hat");
    assert!(hat.price.is_none());
    assert!(hat.weight.is_none());

    // The shirt got its review; the hat has no SKU so no reviews file
    let reviews = read_reviews(dir.path(), "shirt");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].comments.as_deref(), Some("Fits perfectly."));
    assert_eq!(reviews[0].product_name.as_deref(), Some("Linen Shirt"));
    assert_eq!(reviews[0].source.as_deref(), Some("organic"));
    assert!(!dir
        .path()
        .join("products")
        .join("hat")
        .join("reviews.json")
        .exists());

    // Both handles landed in the dedup index
    let index: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("product_list.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(index["products"]["shirt"], "Linen Shirt");
    assert_eq!(index["products"]["hat"], "Straw Hat");
    assert_eq!(index["config-hash"], "hash");
}

#[tokio::test]
async fn test_second_run_skips_everything() {
    let server = MockServer::start().await;
    mount_sale_store(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);

    let first = Orchestrator::new(
        config.clone(),
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );
    let reports = first.run(vec![server.uri()]).await.unwrap();
    assert_eq!(reports[0].products, 2);

    let second = Orchestrator::new(
        config,
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );
    let reports = second.run(vec![server.uri()]).await.unwrap();
    assert_eq!(reports[0].products, 0);
    assert_eq!(reports[0].reviews, 0);
}

#[tokio::test]
async fn test_fresh_run_harvests_again() {
    let server = MockServer::start().await;
    mount_sale_store(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);

    let first = Orchestrator::new(
        config.clone(),
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );
    first.run(vec![server.uri()]).await.unwrap();

    let fresh = Orchestrator::new(
        config,
        "hash".to_string(),
        true,
        CancellationToken::new(),
    );
    let reports = fresh.run(vec![server.uri()]).await.unwrap();
    assert_eq!(reports[0].products, 2);
}

#[tokio::test]
async fn test_pre_seeded_index_resumes_partial_run() {
    let server = MockServer::start().await;
    mount_sale_store(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);

    // A previous run finished the shirt before being interrupted
    std::fs::write(
        dir.path().join("product_list.json"),
        serde_json::json!({
            "config-hash": "hash",
            "updated-at": "2024-01-01T00:00:00Z",
            "products": {"shirt": "Linen Shirt"}
        })
        .to_string(),
    )
    .unwrap();

    let orchestrator = Orchestrator::new(
        config,
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );
    let reports = orchestrator.run(vec![server.uri()]).await.unwrap();

    // Only the hat is new
    assert_eq!(reports[0].products, 1);
    let hat = read_product(dir.path(), "hat");
    assert_eq!(hat.handle, "hat");
    assert!(!dir
        .path()
        .join("products")
        .join("shirt")
        .join("product.json")
        .exists());
}

#[tokio::test]
async fn test_failed_write_leaves_product_for_next_run() {
    let server = MockServer::start().await;
    mount_sale_store(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);

    // A file blocks the output root, so every product write fails
    std::fs::write(dir.path().join("products"), b"").unwrap();

    let broken = Orchestrator::new(
        config.clone(),
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );
    let reports = broken.run(vec![server.uri()]).await.unwrap();
    assert_eq!(reports[0].products, 0);

    // Failed writes must not have marked anything as done
    let index: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("product_list.json")).unwrap(),
    )
    .unwrap();
    assert!(index["products"].as_object().unwrap().is_empty());

    // With the root unblocked, the next run picks both products up
    std::fs::remove_file(dir.path().join("products")).unwrap();
    let retry = Orchestrator::new(
        config,
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );
    let reports = retry.run(vec![server.uri()]).await.unwrap();
    assert_eq!(reports[0].products, 2);
    assert_eq!(read_product(dir.path(), "shirt").handle, "shirt");
}

#[tokio::test]
async fn test_store_without_collections_falls_back_to_flat_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "collections": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": [
                {"handle": "socks", "title": "Wool Socks", "variants": []}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/socks/reviews.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);
    let orchestrator = Orchestrator::new(
        config,
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );

    let reports = orchestrator.run(vec![server.uri()]).await.unwrap();
    assert_eq!(reports[0].products, 1);
    assert_eq!(read_product(dir.path(), "socks").title, "Wool Socks");
}

#[tokio::test]
async fn test_catalog_item_without_handle_is_discarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "collections": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": [
                {"title": "Nameless", "variants": []},
                {"handle": "", "title": "Empty handle", "variants": []}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": []
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);
    let orchestrator = Orchestrator::new(
        config,
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );

    let reports = orchestrator.run(vec![server.uri()]).await.unwrap();
    assert_eq!(reports[0].products, 0);
}

#[tokio::test]
async fn test_failed_enrichment_still_stores_product() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "collections": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": [
                {"handle": "mug", "title": "Mug", "variants": [{"price": "8.00"}]}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "products": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/mug/reviews.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);
    let orchestrator = Orchestrator::new(
        config,
        "hash".to_string(),
        false,
        CancellationToken::new(),
    );

    let reports = orchestrator.run(vec![server.uri()]).await.unwrap();
    assert_eq!(reports[0].products, 1);

    let mug = read_product(dir.path(), "mug");
    assert_eq!(mug.price.as_deref(), Some("8.00"));
    assert!(mug.weight.is_none());
}
