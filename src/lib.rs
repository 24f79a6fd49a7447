//! # prodx
//!
//! A product search and recommendation API backed by in-memory vector
//! similarity search.
//!
//! prodx loads a product catalog and a prebuilt embedding index at startup,
//! then serves free-text search, item-to-item recommendations, catalog
//! analytics and product description generation over a JSON REST API.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! cargo install prodx
//! prodx --backend mock --port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use prodx::prelude::*;
//!
//! // Mock backend: fixed in-memory catalog and index.
//! let ctx = AppContext::mock().unwrap();
//!
//! // Free-text search
//! let results = ctx.retrieval().search("oak table", 5).unwrap();
//! assert!(!results.is_empty());
//!
//! // Recommendations for an existing product
//! let similar = ctx.retrieval().recommend_by_id(&results[0].uniq_id).unwrap();
//! assert!(similar.iter().all(|r| r.uniq_id != results[0].uniq_id));
//! ```
//!
//! ## Crate Structure
//!
//! prodx is composed of two member crates:
//!
//! - [`prodx-core`](https://docs.rs/prodx-core) - Catalog store, similarity
//!   index, embedder, retrieval service, analytics, description generator
//! - [`prodx-api`](https://docs.rs/prodx-api) - REST API

// Re-export core types
pub use prodx_core::{
    summarize, AppContext, Catalog, ContextConfig, DescriptionGenerator, Embedder, Error,
    IndexArtifact, IndexMeta, Record, Result, RetrievalService, SimilarityIndex, Summary, Vector,
};

// Re-export API
pub use prodx_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        summarize, AppContext, Catalog, ContextConfig, DescriptionGenerator, Embedder, Error,
        IndexArtifact, IndexMeta, Record, Result, RetrievalService, SimilarityIndex, Summary,
        Vector, RestApi,
    };
}
