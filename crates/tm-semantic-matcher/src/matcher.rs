//! Semantic Matcher - similarity scoring with substring fallback
//!
//! The scorer is an injected dependency. Tests substitute fakes through
//! `SemanticMatcher::new`, production wires the embedding scorer through
//! `SemanticMatcher::load`.

use tracing::{debug, warn};

use crate::types::{MatchMethod, MatcherConfig, SemanticError, SemanticMatch};

/// A similarity backend that scores a phrase against candidate keywords
pub trait SimilarityScorer: Send + Sync {
    /// Highest similarity between `phrase` and any of `candidates`, in [0, 1]
    fn max_similarity(&self, phrase: &str, candidates: &[String]) -> Result<f32, SemanticError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Undirected, case-insensitive containment check.
///
/// Succeeds with score 1.0 if any keyword contains the phrase or the phrase
/// contains the keyword.
pub fn substring_fallback(phrase: &str, keywords: &[String]) -> SemanticMatch {
    let phrase_l = phrase.to_lowercase();
    let hit = keywords.iter().any(|kw| {
        let kw_l = kw.to_lowercase();
        phrase_l.contains(&kw_l) || kw_l.contains(&phrase_l)
    });

    if hit {
        SemanticMatch {
            is_match: true,
            score: 1.0,
            method: MatchMethod::SubstringFallback,
        }
    } else {
        SemanticMatch::no_match(MatchMethod::SubstringFallback)
    }
}

/// Semantic matcher for risk phrases
pub struct SemanticMatcher {
    scorer: Option<Box<dyn SimilarityScorer>>,
    config: MatcherConfig,
}

impl SemanticMatcher {
    pub fn new(scorer: Option<Box<dyn SimilarityScorer>>, config: MatcherConfig) -> Self {
        Self { scorer, config }
    }

    /// Matcher with no similarity backend; every call uses the substring fallback
    pub fn fallback_only() -> Self {
        Self::new(None, MatcherConfig::default())
    }

    /// Load the embedding scorer, degrading to the fallback if it cannot be built
    #[cfg(feature = "embeddings")]
    pub fn load(config: MatcherConfig) -> Self {
        match crate::embedder::EmbeddingScorer::with_model(&config.model_name) {
            Ok(scorer) => Self::new(Some(Box::new(scorer)), config),
            Err(e) => {
                warn!(error = %e, "Embedding model unavailable, using substring fallback");
                Self::new(None, config)
            }
        }
    }

    /// Without the `embeddings` feature there is no backend to load
    #[cfg(not(feature = "embeddings"))]
    pub fn load(config: MatcherConfig) -> Self {
        warn!(
            model = %config.model_name,
            "Built without embeddings support, using substring fallback"
        );
        Self::new(None, config)
    }

    /// Whether a similarity backend is wired in
    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Compare a phrase against a pool of keywords.
    ///
    /// `is_match` uses the configured threshold; callers wanting a different
    /// decision boundary should read `score` directly.
    pub fn semantic_match(&self, phrase: &str, keywords: &[String]) -> SemanticMatch {
        let Some(scorer) = &self.scorer else {
            return substring_fallback(phrase, keywords);
        };

        match scorer.max_similarity(phrase, keywords) {
            Ok(score) => SemanticMatch {
                is_match: score >= self.config.threshold,
                score,
                method: MatchMethod::Embedding,
            },
            Err(e) => {
                debug!(
                    backend = scorer.name(),
                    error = %e,
                    "Similarity scoring failed, falling back to substring match"
                );
                substring_fallback(phrase, keywords)
            }
        }
    }
}

impl Default for SemanticMatcher {
    fn default() -> Self {
        Self::fallback_only()
    }
}
