//! Phrase-to-keyword similarity for TM coverage assessment
//!
//! Scores how close a free-text risk phrase is to a pool of model keywords.
//! Sentence embeddings are optional; when no scorer is available, or the
//! scorer fails for a given call, matching degrades to undirected substring
//! containment.
//!
//! # Architecture
//!
//! ```text
//! Risk phrase + candidate keywords
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  SimilarityScorer (all-MiniLM-L6-v2)    │
//! │  max cosine(phrase, keyword_i)          │
//! └─────────────────────────────────────────┘
//!       │
//!       ├─── Ok(score) ───► SemanticMatch { score >= 0.55 }
//!       │
//!       ▼  Err(SemanticError)
//! ┌─────────────────────────────────────────┐
//! │  Substring fallback                     │
//! │  kw ⊂ phrase || phrase ⊂ kw → 1.0       │
//! └─────────────────────────────────────────┘
//! ```

#[cfg(feature = "embeddings")]
pub mod embedder;
pub mod matcher;
pub mod types;
pub mod vector;

#[cfg(feature = "embeddings")]
pub use embedder::{Embedder, EmbeddingScorer};
pub use matcher::{substring_fallback, SemanticMatcher, SimilarityScorer};
pub use types::*;
