//! Application context: the read-only state shared by request handlers.
//!
//! All artifacts load in one atomic startup step; any missing or
//! unparsable artifact fails the whole process before the server binds.
//! There is no per-request fallback state. The mock backend builds a small
//! fixed catalog and index in memory so every route works without files on
//! disk.

use crate::analytics::{self, Summary};
use crate::catalog::Catalog;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::generator::{build_prompt, DescriptionGenerator, HttpGenerator};
use crate::index::SimilarityIndex;
use crate::record::Record;
use crate::retrieval::RetrievalService;
use crate::vector::Vector;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Embedding dimension used by the mock backend's in-memory index.
const MOCK_DIM: usize = 64;

/// Startup configuration for the live backend.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub catalog_path: PathBuf,
    pub index_path: PathBuf,
    pub meta_path: PathBuf,
    /// Optional second CSV with per-record cluster assignments.
    pub clustered_path: Option<PathBuf>,
    /// Text-generation service endpoint; canned output when unset.
    pub generator_endpoint: Option<String>,
    pub request_timeout: Duration,
}

pub struct AppContext {
    catalog: Catalog,
    index: SimilarityIndex,
    embedder: Embedder,
    generator: DescriptionGenerator,
    request_timeout: Duration,
}

impl AppContext {
    /// Load all required artifacts. Fails as a whole if any is missing.
    pub fn load(config: &ContextConfig) -> Result<Self> {
        let mut catalog = Catalog::load(&config.catalog_path)?;
        if let Some(path) = &config.clustered_path {
            catalog.apply_clusters(path)?;
        }

        let index = SimilarityIndex::load(&config.index_path, &config.meta_path)?;
        let embedder = Embedder::new(index.dim());

        let generator = match &config.generator_endpoint {
            Some(endpoint) => DescriptionGenerator::Http(HttpGenerator::new(
                endpoint.clone(),
                config.request_timeout,
            )?),
            None => DescriptionGenerator::Canned,
        };

        info!(
            records = catalog.len(),
            indexed = index.len(),
            dim = index.dim(),
            "application context ready"
        );

        Ok(Self {
            catalog,
            index,
            embedder,
            generator,
            request_timeout: config.request_timeout,
        })
    }

    /// Fixed in-memory state for the mock backend.
    pub fn mock() -> Result<Self> {
        let records = mock_records();
        let embedder = Embedder::new(MOCK_DIM);
        let vectors: Vec<Vector> = records
            .iter()
            .map(|r| embedder.embed(&format!("{} {}", r.title, r.description)))
            .collect();
        let ids = records.iter().map(|r| r.uniq_id.clone()).collect();
        let index = SimilarityIndex::from_parts(MOCK_DIM, vectors, ids)?;

        info!(records = records.len(), "mock backend context ready");

        Ok(Self {
            catalog: Catalog::from_records(records),
            index,
            embedder,
            generator: DescriptionGenerator::Canned,
            request_timeout: Duration::from_secs(30),
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub fn retrieval(&self) -> RetrievalService<'_> {
        RetrievalService::new(&self.catalog, &self.index, &self.embedder)
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        analytics::summarize(&self.catalog)
    }

    /// Generate a description for a catalog product.
    ///
    /// Fails with [`Error::NotFound`] when the identifier matches nothing.
    pub async fn generate_description(&self, product_id: &str) -> Result<String> {
        let record = self
            .catalog
            .find_by_identifier(product_id)
            .ok_or_else(|| Error::NotFound(product_id.to_string()))?;
        let prompt = build_prompt(record);
        self.generator.generate(&prompt).await
    }
}

fn mock_records() -> Vec<Record> {
    let rows = [
        (
            "mock-id-1",
            "Red Fabric Armchair",
            "Test Brand",
            "['Furniture', 'Chairs']",
            "Fabric",
            "Red",
            29.99,
            "A comfortable red armchair for small living rooms.",
            0,
        ),
        (
            "mock-id-2",
            "Blue Fabric Armchair",
            "Test Brand 2",
            "['Furniture', 'Chairs']",
            "Fabric",
            "Blue",
            39.99,
            "A comfortable blue armchair with wooden legs.",
            0,
        ),
        (
            "mock-id-3",
            "Oak Dining Table",
            "Test Brand",
            "['Furniture', 'Tables']",
            "Oak",
            "Natural",
            149.99,
            "A solid oak dining table seating six.",
            1,
        ),
        (
            "mock-id-4",
            "Brass Floor Lamp",
            "Lumen Co",
            "['Lighting', 'Lamps']",
            "Brass",
            "Gold",
            59.99,
            "A tall brass floor lamp with a linen shade.",
            1,
        ),
    ];

    rows.into_iter()
        .map(
            |(uniq_id, title, brand, categories, material, color, price, description, cluster)| {
                Record {
                    id: uniq_id.to_string(),
                    uniq_id: uniq_id.to_string(),
                    title: title.to_string(),
                    brand: brand.to_string(),
                    categories: categories.to_string(),
                    material: material.to_string(),
                    color: color.to_string(),
                    price: Some(price),
                    description: description.to_string(),
                    cluster: Some(cluster),
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_context_serves_search() {
        let ctx = AppContext::mock().unwrap();
        let results = ctx.retrieval().search("armchair", 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_mock_context_recommend() {
        let ctx = AppContext::mock().unwrap();
        let results = ctx.retrieval().recommend_by_id("mock-id-1").unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.uniq_id != "mock-id-1"));
    }

    #[test]
    fn test_mock_context_summary() {
        let ctx = AppContext::mock().unwrap();
        let summary = ctx.summary();
        assert_eq!(summary.count, 4);
        assert!(summary.price_mean > 0.0);
        assert!(!summary.top_categories.is_empty());
        assert_eq!(summary.cluster_stats.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_context_generates_description() {
        let ctx = AppContext::mock().unwrap();
        let generated = ctx.generate_description("mock-id-3").await.unwrap();
        assert!(generated.contains("Oak Dining Table"));
    }

    #[tokio::test]
    async fn test_generate_description_unknown_product() {
        let ctx = AppContext::mock().unwrap();
        assert!(matches!(
            ctx.generate_description("nope").await,
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_load_fails_fast_on_missing_artifacts() {
        let config = ContextConfig {
            catalog_path: PathBuf::from("/nonexistent/products.csv"),
            index_path: PathBuf::from("/nonexistent/index.bin"),
            meta_path: PathBuf::from("/nonexistent/meta.json"),
            clustered_path: None,
            generator_endpoint: None,
            request_timeout: Duration::from_secs(5),
        };
        assert!(matches!(AppContext::load(&config), Err(Error::DataLoad(_))));
    }
}
