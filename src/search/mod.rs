//! Creator search
//!
//! Embedding similarity ranking with a keyword fallback.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │               SearchRequest (+ hints from query text)          │
//! └────────────────────────────────────────────────────────────────┘
//!                                │
//!                     ResultCache hit? ──── yes ──▶ cached response
//!                                │ no
//!                                ▼
//! ┌──────────────────────────────┐  query embedding fails
//! │   EmbeddingAdapter           │ ─────────────────────────┐
//! │   (cache, retry, batches)    │                          │
//! └──────────────────────────────┘                          ▼
//!                │                         ┌──────────────────────────────┐
//!                ▼                         │   Keyword overlap scoring    │
//! ┌──────────────────────────────┐         └──────────────────────────────┘
//! │   VectorIndex (linear scan)  │                          │
//! └──────────────────────────────┘                          │
//!                │                                          │
//!                ▼                                          │
//!        SearchFilters, in score order ◀────────────────────┘
//!                │
//!                ▼
//!        ResultItems + creator_score
//! ```

pub mod adapter;
pub mod embeddings;
pub mod engine;
pub mod filters;
pub mod index;
pub mod query;
pub mod scoring;
pub mod suggest;
pub mod types;

// Re-export main types
pub use adapter::EmbeddingAdapter;
pub use embeddings::{ApiEmbedder, EmbeddingProvider, HashEmbedder, build_provider};
pub use engine::{SearchEngine, explain_empty, keyword_results};
pub use filters::SearchFilters;
pub use index::{ScoredCandidate, SimilarityMetric, VectorIndex, cosine_similarity};
pub use query::{QueryHints, extract_hints};
pub use scoring::{creator_score, keyword_score};
pub use suggest::suggest;
pub use types::{BatchSearchRequest, BatchSearchResponse, ResultItem, SearchRequest, SearchResponse};
