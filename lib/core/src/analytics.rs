//! Descriptive statistics over the catalog.
//!
//! Everything here degrades independently: a catalog without prices,
//! categories, brands or cluster assignments still summarizes without
//! error, substituting zeros and empty tables per field.

use crate::catalog::Catalog;
use ahash::AHashMap;
use serde::Serialize;

/// Number of entries kept in the frequency tables.
pub const TOP_N: usize = 10;

/// A name with its occurrence count. Serialized as an ordered array so the
/// descending-frequency order survives JSON encoding.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrequencyEntry {
    pub name: String,
    pub count: u64,
}

/// Per-cluster price aggregates, one row per cluster id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClusterStats {
    pub cluster: i64,
    pub count: u64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub count: u64,
    pub price_mean: f64,
    pub top_categories: Vec<FrequencyEntry>,
    pub top_brands: Vec<FrequencyEntry>,
    pub cluster_stats: Vec<ClusterStats>,
}

/// Summarize the catalog: record count, mean price over parseable prices,
/// top categories and brands, and per-cluster aggregates when cluster
/// assignments exist.
#[must_use]
pub fn summarize(catalog: &Catalog) -> Summary {
    let records = catalog.records();

    let prices: Vec<f64> = records.iter().filter_map(|r| r.price).collect();
    let price_mean = if prices.is_empty() {
        0.0
    } else {
        prices.iter().sum::<f64>() / prices.len() as f64
    };

    let categories = records
        .iter()
        .flat_map(|r| parse_categories(&r.categories));
    let top_categories = top_frequencies(categories);

    let brands = records
        .iter()
        .map(|r| r.brand.trim())
        .filter(|b| !b.is_empty())
        .map(str::to_string);
    let top_brands = top_frequencies(brands);

    Summary {
        count: records.len() as u64,
        price_mean,
        top_categories,
        top_brands,
        cluster_stats: cluster_stats(catalog),
    }
}

/// Parse a serialized category list such as `"['Home & Kitchen', 'Furniture']"`
/// into its entries, stripping bracket and quote punctuation.
#[must_use]
pub fn parse_categories(raw: &str) -> Vec<String> {
    let stripped = raw.trim().trim_matches(|c| "[]'\"".contains(c));
    stripped
        .split(',')
        .map(|c| c.trim().trim_matches(|c| "'\"".contains(c)).trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Top-N values by frequency, descending, ties broken by first appearance.
fn top_frequencies<I: Iterator<Item = String>>(values: I) -> Vec<FrequencyEntry> {
    let mut counts: AHashMap<String, (u64, usize)> = AHashMap::new();
    for (order, value) in values.enumerate() {
        let entry = counts.entry(value).or_insert((0, order));
        entry.0 += 1;
    }

    let mut entries: Vec<(String, u64, usize)> = counts
        .into_iter()
        .map(|(name, (count, order))| (name, count, order))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    entries.truncate(TOP_N);
    entries
        .into_iter()
        .map(|(name, count, _)| FrequencyEntry { name, count })
        .collect()
}

fn cluster_stats(catalog: &Catalog) -> Vec<ClusterStats> {
    let mut groups: AHashMap<i64, (u64, Vec<f64>)> = AHashMap::new();
    for record in catalog.records() {
        let Some(cluster) = record.cluster else {
            continue;
        };
        let entry = groups.entry(cluster).or_insert((0, Vec::new()));
        entry.0 += 1;
        if let Some(price) = record.price {
            entry.1.push(price);
        }
    }

    let mut stats: Vec<ClusterStats> = groups
        .into_iter()
        .map(|(cluster, (count, prices))| {
            if prices.is_empty() {
                ClusterStats {
                    cluster,
                    count,
                    avg_price: 0.0,
                    min_price: 0.0,
                    max_price: 0.0,
                }
            } else {
                ClusterStats {
                    cluster,
                    count,
                    avg_price: prices.iter().sum::<f64>() / prices.len() as f64,
                    min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
                    max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                }
            }
        })
        .collect();
    stats.sort_by_key(|s| s.cluster);
    stats
}
