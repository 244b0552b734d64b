use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A manufacturer entry of the brand index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brand {
    pub listing_url: String,
    pub display_name: String,
    pub advertised_model_count: usize,
}

/// A model as it appears on a listing page, before its detail page is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStub {
    pub detail_url: String,
    pub display_name: String,
    pub discovered_at: DateTime<Utc>,
}

/// One leaf of the category tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub value: Option<String>,
    pub value_metadata: Option<String>,
    pub sub_category_metadata: Option<String>,
}

/// Category name -> sub-category name -> value.
pub type CategoryTree = BTreeMap<String, BTreeMap<String, AttributeValue>>;

/// The persisted unit, one per line of a brand's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub model_name: String,
    pub model_page_url: String,
    pub brand: String,
    #[serde(default)]
    pub hits: Option<String>,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub category_tree: CategoryTree,
    #[serde(default)]
    pub fetch_failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub discovered_at: Option<DateTime<Utc>>,
}

impl AttributeRecord {
    /// Record of a model whose detail page could not be fetched or extracted.
    pub fn failed(brand: &Brand, stub: &ModelStub, error: impl ToString) -> Self {
        Self {
            model_name: stub.display_name.clone(),
            model_page_url: stub.detail_url.clone(),
            brand: brand.display_name.clone(),
            hits: None,
            trend: None,
            category_tree: CategoryTree::new(),
            fetch_failed: true,
            error_message: Some(error.to_string()),
            discovered_at: Some(stub.discovered_at),
        }
    }
}
