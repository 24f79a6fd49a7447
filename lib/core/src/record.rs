//! Product records and identifier reconciliation.
//!
//! Catalog rows deserialize into [`RawRecord`], which tolerates missing
//! columns. [`RawRecord::normalize`] turns a row into a [`Record`] with both
//! identifier fields populated: a row may carry `id`, `uniq_id`, or both,
//! and whichever is missing is derived from the other.

use serde::{Deserialize, Serialize};

/// A product row as it appears in the catalog CSV, before normalization.
///
/// Every column is optional so that partial datasets still load; the only
/// hard requirement is that at least one identifier field is present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uniq_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cluster: Option<i64>,
}

/// A fully resolved product record.
///
/// Invariant: `id` and `uniq_id` are always both populated. When the source
/// row supplied only one of them, the other is a copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: String,
    pub uniq_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub brand: String,
    /// Serialized category list, e.g. `"['Home & Kitchen', 'Furniture']"`.
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub color: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<i64>,
}

impl RawRecord {
    /// Normalize the row, backfilling whichever identifier is missing.
    ///
    /// Returns `None` when neither identifier is present; callers skip such
    /// rows rather than failing the whole load.
    pub fn normalize(self) -> Option<Record> {
        let id = self.id.filter(|s| !s.trim().is_empty());
        let uniq_id = self.uniq_id.filter(|s| !s.trim().is_empty());

        let (id, uniq_id) = match (id, uniq_id) {
            (Some(id), Some(uniq_id)) => (id, uniq_id),
            (Some(id), None) => (id.clone(), id),
            (None, Some(uniq_id)) => (uniq_id.clone(), uniq_id),
            (None, None) => return None,
        };

        Some(Record {
            id,
            uniq_id,
            title: self.title.unwrap_or_default(),
            brand: self.brand.unwrap_or_default(),
            categories: self.categories.unwrap_or_default(),
            material: self.material.unwrap_or_default(),
            color: self.color.unwrap_or_default(),
            price: self.price.as_deref().and_then(parse_price),
            description: self.description.unwrap_or_default(),
            cluster: self.cluster,
        })
    }
}

/// Parse a price field leniently: currency symbols and thousands separators
/// are stripped, anything else non-numeric yields `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}
