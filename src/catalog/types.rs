//! Catalog API response shapes and the stored product record
//!
//! Every wire field is optional: the catalog API omits fields freely and
//! a missing field must never fail a page decode. Default-substitution
//! happens once, when an [`ApiProduct`] is turned into a [`Product`].

use serde::{Deserialize, Serialize};

/// One page of the collections endpoint
#[derive(Debug, Default, Deserialize)]
pub struct CollectionsPage {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

/// A collection entry; only the handle is consumed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Collection {
    pub handle: Option<String>,
}

/// One page of a products endpoint (per collection or flat)
#[derive(Debug, Default, Deserialize)]
pub struct ProductsPage {
    #[serde(default)]
    pub products: Vec<ApiProduct>,
}

/// A raw product item as returned by the catalog API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiProduct {
    pub handle: Option<String>,
    pub title: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub body_html: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A purchasable variant of a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub price: Option<String>,
    pub sku: Option<String>,
    pub weight: Option<f64>,
    pub inventory_quantity: Option<i64>,
    pub compare_at_price: Option<String>,
}

/// A product image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Body of the per-product supplementary endpoint
#[derive(Debug, Default, Deserialize)]
pub struct EnrichmentPage {
    pub product: Option<EnrichmentProduct>,
}

/// Supplementary variant and image data for one product
#[derive(Debug, Default, Deserialize)]
pub struct EnrichmentProduct {
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A fully built product record, persisted once and never mutated again
/// within a run
///
/// The handle is the stable identity; items arriving without one are
/// discarded before this type is ever constructed. All free-text fields
/// have been normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub handle: String,
    pub title: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: Vec<String>,
    pub price: Option<String>,
    pub description: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub variants: Vec<Variant>,
    pub images: Vec<Image>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<String>,
}

impl Product {
    /// The SKU of the first variant, used as the reviews lookup key
    ///
    /// Returns `None` when the product has no variants or the first
    /// variant carries no SKU, in which case reviews cannot be fetched
    /// for this product.
    pub fn first_variant_sku(&self) -> Option<&str> {
        self.variants
            .first()
            .and_then(|v| v.sku.as_deref())
            .filter(|sku| !sku.is_empty())
    }
}
