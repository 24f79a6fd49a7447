//! Similarity index over prebuilt product embeddings.
//!
//! The index is loaded from two artifacts produced by the offline pipeline:
//! a bincode file holding the stored vectors ([`IndexArtifact`]) and a JSON
//! metadata file ([`IndexMeta`]) whose `ids` sequence maps slot position to
//! product identifier. Slot *i*'s vector belongs to `ids[i]`'s product.
//!
//! Queries are an exact scan over the stored vectors, ascending L2
//! distance. The metric and dimensionality are fixed at build time; the
//! embedder is responsible for producing compatible query vectors.

use crate::error::{Error, Result};
use crate::vector::Vector;
use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// On-disk vector artifact, bincode-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexArtifact {
    pub dim: usize,
    pub vectors: Vec<Vec<f32>>,
}

impl IndexArtifact {
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        bincode::serialize_into(BufWriter::new(file), self)
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// On-disk slot metadata, JSON-encoded: an ordered sequence aligned with
/// the artifact's vector slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub ids: Vec<String>,
}

impl IndexMeta {
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer(BufWriter::new(file), self)
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Read-only nearest-neighbor index with a slot → identifier mapping.
pub struct SimilarityIndex {
    dim: usize,
    vectors: Vec<Vector>,
    ids: Vec<String>,
    slots: AHashMap<String, usize>,
}

impl SimilarityIndex {
    /// Load the index and its slot metadata, validating that they align.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(index_path: P, meta_path: Q) -> Result<Self> {
        let index_path = index_path.as_ref();
        let meta_path = meta_path.as_ref();

        let file = File::open(index_path)
            .map_err(|e| Error::DataLoad(format!("{}: {}", index_path.display(), e)))?;
        let artifact: IndexArtifact = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| Error::DataLoad(format!("{}: {}", index_path.display(), e)))?;

        let file = File::open(meta_path)
            .map_err(|e| Error::DataLoad(format!("{}: {}", meta_path.display(), e)))?;
        let meta: IndexMeta = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::DataLoad(format!("{}: {}", meta_path.display(), e)))?;

        let vectors = artifact.vectors.into_iter().map(Vector::new).collect();
        let index = Self::from_parts(artifact.dim, vectors, meta.ids)?;
        info!(
            slots = index.len(),
            dim = index.dim(),
            "similarity index loaded"
        );
        Ok(index)
    }

    /// Assemble an index from in-memory parts, enforcing the slot/identifier
    /// alignment invariant.
    pub fn from_parts(dim: usize, vectors: Vec<Vector>, ids: Vec<String>) -> Result<Self> {
        if dim == 0 {
            return Err(Error::DataLoad(
                "index dimension must be positive".to_string(),
            ));
        }
        if ids.len() != vectors.len() {
            return Err(Error::DataLoad(format!(
                "slot metadata has {} ids but index stores {} vectors",
                ids.len(),
                vectors.len()
            )));
        }
        if let Some(bad) = vectors.iter().position(|v| v.dim() != dim) {
            return Err(Error::DataLoad(format!(
                "vector at slot {} has dimension {}, expected {}",
                bad,
                vectors[bad].dim(),
                dim
            )));
        }

        let mut slots = AHashMap::with_capacity(ids.len());
        for (slot, id) in ids.iter().enumerate() {
            slots.entry(id.clone()).or_insert(slot);
        }

        Ok(Self {
            dim,
            vectors,
            ids,
            slots,
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Slot position for an identifier, if it is indexed.
    #[must_use]
    pub fn slot_of(&self, identifier: &str) -> Option<usize> {
        self.slots.get(identifier).copied()
    }

    /// Stored vector at a slot position.
    #[must_use]
    pub fn reconstruct(&self, slot: usize) -> Option<&Vector> {
        self.vectors.get(slot)
    }

    /// Stored vector for an identifier.
    pub fn vector_for(&self, identifier: &str) -> Result<&Vector> {
        let slot = self.slot_of(identifier).ok_or_else(|| {
            Error::IndexInconsistency(format!("identifier not indexed: {identifier}"))
        })?;
        // slot comes from the alignment-checked mapping
        Ok(&self.vectors[slot])
    }

    /// The `k` nearest stored vectors to `query`, ascending by L2 distance.
    ///
    /// `k` is clamped to the index size. Ties resolve to the lower slot.
    #[must_use]
    pub fn nearest(&self, query: &Vector, k: usize) -> Vec<(f32, &str)> {
        let k = k.min(self.len());
        if k == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(slot, v)| (query.l2_distance(v), slot))
            .collect();
        candidates.sort_by_key(|&(dist, slot)| (OrderedFloat(dist), slot));
        candidates.truncate(k);

        candidates
            .into_iter()
            .map(|(dist, slot)| (dist, self.ids[slot].as_str()))
            .collect()
    }
}
