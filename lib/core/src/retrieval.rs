//! Retrieval service: the orchestration of embedder, similarity index and
//! catalog into search and recommendation results.
//!
//! Both entry points resolve neighbor identifiers against the catalog by
//! either identifier field and return records ordered by their neighbor
//! rank from the index, nearest first.

use crate::catalog::Catalog;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::index::SimilarityIndex;
use crate::record::Record;
use ahash::AHashMap;
use tracing::{debug, warn};

/// Number of recommendations returned by [`RetrievalService::recommend_by_id`].
pub const RECOMMEND_NEIGHBORS: usize = 5;

/// Read-only view over the shared state, constructed per call.
pub struct RetrievalService<'a> {
    catalog: &'a Catalog,
    index: &'a SimilarityIndex,
    embedder: &'a Embedder,
}

impl<'a> RetrievalService<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, index: &'a SimilarityIndex, embedder: &'a Embedder) -> Self {
        Self {
            catalog,
            index,
            embedder,
        }
    }

    /// Search the catalog by free text.
    ///
    /// Embeds the query, finds the `top_k` nearest neighbors (clamped to
    /// the index size) and hydrates them into full catalog records in
    /// neighbor rank order.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<Record>> {
        if top_k < 1 {
            return Err(Error::InvalidRequest(
                "top_k must be at least 1".to_string(),
            ));
        }

        let query_vector = self.embedder.embed(query);
        let neighbors = self.index.nearest(&query_vector, top_k);
        debug!(query, top_k, neighbors = neighbors.len(), "search");

        let ids: Vec<&str> = neighbors.iter().map(|&(_, id)| id).collect();
        Ok(self.resolve_ranked(&ids))
    }

    /// Recommend products similar to an existing one.
    ///
    /// Fails with [`Error::NotFound`] when the identifier is absent from
    /// the catalog. A catalog record missing from the index is tolerated
    /// drift and yields an empty result list.
    pub fn recommend_by_id(&self, product_id: &str) -> Result<Vec<Record>> {
        let record = self
            .catalog
            .find_by_identifier(product_id)
            .ok_or_else(|| Error::NotFound(product_id.to_string()))?;

        let slot = self
            .index
            .slot_of(&record.uniq_id)
            .or_else(|| self.index.slot_of(&record.id));
        let Some(slot) = slot else {
            warn!(product_id, "product in catalog but not in index");
            return Ok(Vec::new());
        };

        let Some(stored) = self.index.reconstruct(slot) else {
            return Ok(Vec::new());
        };

        // One extra neighbor: the product's own vector is its nearest
        // neighbor at distance zero.
        let neighbors = self.index.nearest(stored, RECOMMEND_NEIGHBORS + 1);
        let self_first = self
            .index
            .slot_of(neighbors.first().map(|&(_, id)| id).unwrap_or_default())
            == Some(slot);

        // Trust position 0 only: with duplicate vectors the self-match is
        // not guaranteed to come first.
        let kept: Vec<&str> = if self_first {
            neighbors
                .iter()
                .skip(1)
                .map(|&(_, id)| id)
                .take(RECOMMEND_NEIGHBORS)
                .collect()
        } else {
            neighbors
                .iter()
                .map(|&(_, id)| id)
                .take(RECOMMEND_NEIGHBORS)
                .collect()
        };

        Ok(self.resolve_ranked(&kept))
    }

    /// Hydrate neighbor identifiers into owned records, re-sorted by the
    /// rank the index assigned them.
    fn resolve_ranked(&self, ranked_ids: &[&str]) -> Vec<Record> {
        let mut rank: AHashMap<&str, usize> = AHashMap::with_capacity(ranked_ids.len());
        for (i, &id) in ranked_ids.iter().enumerate() {
            // First occurrence wins, as in the slot mapping.
            rank.entry(id).or_insert(i);
        }

        let mut resolved: Vec<&Record> = self.catalog.find_many(ranked_ids);
        resolved.sort_by_key(|r| {
            rank.get(r.uniq_id.as_str())
                .or_else(|| rank.get(r.id.as_str()))
                .copied()
                .unwrap_or(usize::MAX)
        });
        resolved.into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector;

    fn record(uniq_id: &str, title: &str, price: f64) -> Record {
        Record {
            id: uniq_id.to_string(),
            uniq_id: uniq_id.to_string(),
            title: title.to_string(),
            brand: String::new(),
            categories: String::new(),
            material: String::new(),
            color: String::new(),
            price: Some(price),
            description: String::new(),
            cluster: None,
        }
    }

    struct Fixture {
        catalog: Catalog,
        index: SimilarityIndex,
        embedder: Embedder,
    }

    impl Fixture {
        fn service(&self) -> RetrievalService<'_> {
            RetrievalService::new(&self.catalog, &self.index, &self.embedder)
        }
    }

    /// Catalog and index built from embedded titles, so text queries land
    /// on the expected products.
    fn embedded_fixture() -> Fixture {
        let records = vec![
            record("a", "Red Chair", 20.0),
            record("b", "Blue Chair", 30.0),
            record("c", "Oak Table", 45.0),
            record("d", "Floor Lamp", 15.0),
        ];
        let embedder = Embedder::new(64);
        let vectors: Vec<Vector> = records.iter().map(|r| embedder.embed(&r.title)).collect();
        let ids = records.iter().map(|r| r.uniq_id.clone()).collect();
        let index = SimilarityIndex::from_parts(64, vectors, ids).unwrap();
        Fixture {
            catalog: Catalog::from_records(records),
            index,
            embedder,
        }
    }

    #[test]
    fn test_search_returns_at_most_top_k() {
        let fixture = embedded_fixture();
        let results = fixture.service().search("chair", 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_search_clamps_top_k_to_index_size() {
        let fixture = embedded_fixture();
        let results = fixture.service().search("chair", 100).unwrap();
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn test_search_rejects_zero_top_k() {
        let fixture = embedded_fixture();
        assert!(matches!(
            fixture.service().search("chair", 0),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_search_exact_title_ranks_first() {
        let fixture = embedded_fixture();
        let results = fixture.service().search("Red Chair", 4).unwrap();
        assert_eq!(results[0].uniq_id, "a");
    }

    #[test]
    fn test_search_is_idempotent() {
        let fixture = embedded_fixture();
        let first = fixture.service().search("wooden table", 3).unwrap();
        let second = fixture.service().search("wooden table", 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_order_follows_neighbor_rank() {
        let fixture = embedded_fixture();
        let query = fixture.embedder.embed("Oak Table");
        let expected: Vec<String> = fixture
            .index
            .nearest(&query, 4)
            .iter()
            .map(|&(_, id)| id.to_string())
            .collect();
        let results = fixture.service().search("Oak Table", 4).unwrap();
        let actual: Vec<String> = results.iter().map(|r| r.uniq_id.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_recommend_excludes_self() {
        let fixture = embedded_fixture();
        let results = fixture.service().recommend_by_id("a").unwrap();
        assert!(results.iter().all(|r| r.uniq_id != "a"));
        assert_eq!(results.len(), 3); // 4-slot index minus self
    }

    #[test]
    fn test_recommend_unknown_product_is_not_found() {
        let fixture = embedded_fixture();
        assert!(matches!(
            fixture.service().recommend_by_id("nope"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_recommend_index_miss_returns_empty() {
        // "e" exists in the catalog but has no slot in the index.
        let mut records = vec![
            record("a", "Red Chair", 20.0),
            record("b", "Blue Chair", 30.0),
        ];
        records.push(record("e", "Unindexed Stool", 10.0));
        let embedder = Embedder::new(64);
        let vectors: Vec<Vector> = records[..2]
            .iter()
            .map(|r| embedder.embed(&r.title))
            .collect();
        let ids = records[..2].iter().map(|r| r.uniq_id.clone()).collect();
        let index = SimilarityIndex::from_parts(64, vectors, ids).unwrap();
        let catalog = Catalog::from_records(records);

        let service = RetrievalService::new(&catalog, &index, &embedder);
        let results = service.recommend_by_id("e").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_recommend_resolves_by_either_field() {
        // Record whose id differs from its uniq_id; the index maps the
        // uniq_id. The unified lookup must still find its neighbors.
        let mut alias = record("b", "Blue Chair", 30.0);
        alias.id = "alias-b".to_string();
        let records = vec![record("a", "Red Chair", 20.0), alias];
        let embedder = Embedder::new(64);
        let vectors: Vec<Vector> = records.iter().map(|r| embedder.embed(&r.title)).collect();
        let ids = records.iter().map(|r| r.uniq_id.clone()).collect();
        let index = SimilarityIndex::from_parts(64, vectors, ids).unwrap();
        let catalog = Catalog::from_records(records);
        let service = RetrievalService::new(&catalog, &index, &embedder);

        let results = service.recommend_by_id("alias-b").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].uniq_id, "a");
    }

    #[test]
    fn test_duplicate_index_ids_keep_first_rank() {
        // The slot metadata may map several slots to the same identifier;
        // a record's rank must come from its first appearance among the
        // neighbors, matching the first-wins slot mapping.
        let records = vec![
            record("a", "Red Chair", 20.0),
            record("b", "Blue Chair", 30.0),
            record("c", "Oak Table", 45.0),
        ];
        let catalog = Catalog::from_records(records);
        let index = SimilarityIndex::from_parts(
            2,
            vec![
                Vector::new(vec![0.9, 0.0]),
                Vector::new(vec![1.0, 0.0]),
                Vector::new(vec![1.2, 0.0]),
                Vector::new(vec![3.0, 0.0]),
            ],
            vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "a".to_string(),
            ],
        )
        .unwrap();
        let embedder = Embedder::new(2);
        let service = RetrievalService::new(&catalog, &index, &embedder);

        // Neighbors of "b" in distance order: "a" (slot 0), "c", "a"
        // (slot 3). "a" ranks by its first appearance, ahead of "c".
        let results = service.recommend_by_id("b").unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.uniq_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_worked_example_from_contract() {
        // Two-record catalog, slot 0 → "a", slot 1 → "b"; a query vector
        // nearer slot 0 with top_k=1 returns exactly record "a".
        let records = vec![
            record("a", "Red Chair", 20.0),
            record("b", "Blue Chair", 30.0),
        ];
        let catalog = Catalog::from_records(records);
        let index = SimilarityIndex::from_parts(
            2,
            vec![Vector::new(vec![0.0, 0.0]), Vector::new(vec![10.0, 0.0])],
            vec!["a".to_string(), "b".to_string()],
        )
        .unwrap();

        let neighbors = index.nearest(&Vector::new(vec![1.0, 0.0]), 1);
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].1, "a");

        let resolved = catalog.find_many([neighbors[0].1]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].title, "Red Chair");
        assert_eq!(resolved[0].price, Some(20.0));
    }
}
