//! Shared types for similarity scoring

use serde::{Deserialize, Serialize};

/// Default sentence-embedding model
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Default cut-off for `SemanticMatch::is_match`.
///
/// Callers that record matches apply their own, stricter threshold on the raw
/// score rather than trusting this flag.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.55;

/// How a similarity score was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Cosine similarity over sentence embeddings
    Embedding,
    /// Case-insensitive bidirectional substring containment
    SubstringFallback,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMethod::Embedding => write!(f, "embedding"),
            MatchMethod::SubstringFallback => write!(f, "substring_fallback"),
        }
    }
}

/// Outcome of comparing one phrase against a pool of keywords
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemanticMatch {
    pub is_match: bool,
    /// Best score over all candidates, in [0, 1]
    pub score: f32,
    pub method: MatchMethod,
}

impl SemanticMatch {
    pub fn no_match(method: MatchMethod) -> Self {
        Self {
            is_match: false,
            score: 0.0,
            method,
        }
    }
}

/// Configuration for the semantic matcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// HuggingFace model repository used by the embedding scorer
    pub model_name: String,
    /// Score at or above which `is_match` is set
    pub threshold: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

/// Similarity capability errors
///
/// None of these are fatal to an assessment run: the matcher answers every
/// one of them with the substring fallback.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    #[error("Failed to load embedding model: {0}")]
    ModelLoad(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("No candidate keywords to compare against")]
    EmptyCandidates,

    #[error("Similarity backend unavailable")]
    Unavailable,
}
