//! Reviews API response shapes and the stored review record

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of the reviews timeline endpoint
#[derive(Debug, Default, Deserialize)]
pub struct TimelinePage {
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

/// A timeline entry wrapping the actual review document
#[derive(Debug, Default, Deserialize)]
pub struct TimelineEntry {
    #[serde(rename = "_source")]
    pub source: Option<ReviewSource>,
}

/// A raw review as returned by the reviews API
///
/// Ratings and order identifiers arrive as numbers or strings depending
/// on the store, so both stay untyped JSON values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewSource {
    pub author: Option<String>,
    pub rating: Option<Value>,
    pub comments: Option<String>,
    pub product_name: Option<String>,
    pub date_created: Option<String>,
    pub sku: Option<String>,
    pub order_id: Option<Value>,
    pub source: Option<String>,
}

/// A stored review record
///
/// Author, comments and product name are normalized; rating, date, sku,
/// order id and source pass through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: Option<String>,
    pub rating: Option<Value>,
    pub comments: Option<String>,
    pub product_name: Option<String>,
    pub date_created: Option<String>,
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}
