//! # prodx Core
//!
//! Core library for the prodx product search and recommendation service.
//!
//! This crate provides the retrieval pipeline and its collaborators:
//!
//! - [`Catalog`] - In-memory product catalog with identifier lookup
//! - [`SimilarityIndex`] - Prebuilt nearest-neighbor index with slot mapping
//! - [`Embedder`] - Deterministic text-to-vector embedding
//! - [`RetrievalService`] - Search and recommend orchestration
//! - [`DescriptionGenerator`] - External text-generation collaborator
//! - [`AppContext`] - Load-once shared state handed to request handlers
//!
//! ## Example
//!
//! ```rust
//! use prodx_core::AppContext;
//!
//! // Mock backend: fixed in-memory catalog and index, no files needed.
//! let ctx = AppContext::mock().unwrap();
//! let results = ctx.retrieval().search("armchair", 5).unwrap();
//! assert!(!results.is_empty());
//! ```

pub mod analytics;
pub mod catalog;
pub mod context;
pub mod embedder;
pub mod error;
pub mod generator;
pub mod index;
pub mod record;
pub mod retrieval;
pub mod vector;

pub use analytics::{summarize, ClusterStats, FrequencyEntry, Summary};
pub use catalog::Catalog;
pub use context::{AppContext, ContextConfig};
pub use embedder::Embedder;
pub use error::{Error, Result};
pub use generator::{build_prompt, DescriptionGenerator, HttpGenerator};
pub use index::{IndexArtifact, IndexMeta, SimilarityIndex};
pub use record::{parse_price, RawRecord, Record};
pub use retrieval::{RetrievalService, RECOMMEND_NEIGHBORS};
pub use vector::Vector;
