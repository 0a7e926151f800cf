//! Matching and classification
//!
//! The engine is pure: it mutates the models it is handed but never touches
//! storage. Persisting is `CoverageService`'s job.

use tm_semantic_matcher::SemanticMatcher;
use tracing::{debug, info};

use super::result::{CoverageResult, CoverageStatus};
use crate::models::TmModel;

/// Minimum similarity score for recording a semantic match.
///
/// Deliberately stricter than the matcher's own `is_match` cut-off.
pub const MATCH_THRESHOLD: f32 = 0.70;

/// Switches for one assessment run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessOptions {
    pub semantic_enabled: bool,
    /// Append unmatched phrases to each model's `not_covered_risks`
    pub auto_update: bool,
}

impl Default for AssessOptions {
    fn default() -> Self {
        Self {
            semantic_enabled: true,
            auto_update: true,
        }
    }
}

/// Output of `CoverageEngine::assess`
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRun {
    /// One result per model, in model input order
    pub results: Vec<CoverageResult>,
    /// Whether any model's `not_covered_risks` grew
    pub updated: bool,
}

/// Case-insensitive containment in either direction
pub fn bidirectional_contains(phrase_lower: &str, keyword: &str) -> bool {
    let kw = keyword.to_lowercase();
    phrase_lower.contains(&kw) || kw.contains(phrase_lower)
}

fn bucket_hit(phrase_lower: &str, bucket: &[String]) -> bool {
    bucket.iter().any(|kw| bidirectional_contains(phrase_lower, kw))
}

/// How a single phrase resolved against one model
enum PhraseMatch {
    Keyword,
    Semantic(f32),
    Unmatched,
}

/// Coverage assessment engine
pub struct CoverageEngine {
    matcher: SemanticMatcher,
}

impl CoverageEngine {
    pub fn new(matcher: SemanticMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &SemanticMatcher {
        &self.matcher
    }

    /// Assess `phrases` against every model.
    ///
    /// With `auto_update`, unmatched phrases not already present in a model's
    /// `not_covered_risks` are appended to it and `updated` is set.
    pub fn assess(
        &self,
        phrases: &[String],
        models: &mut [TmModel],
        options: AssessOptions,
    ) -> CoverageRun {
        let mut updated = false;
        let mut results = Vec::with_capacity(models.len());

        for model in models.iter_mut() {
            let (result, model_updated) = self.assess_model(phrases, model, options);
            updated |= model_updated;
            results.push(result);
        }

        info!(
            phrases = phrases.len(),
            models = results.len(),
            updated,
            "Coverage assessment complete"
        );

        CoverageRun { results, updated }
    }

    fn assess_model(
        &self,
        phrases: &[String],
        model: &mut TmModel,
        options: AssessOptions,
    ) -> (CoverageResult, bool) {
        // Semantic candidate pool is fixed at the start of the model's pass
        let all_known_risks = model.all_known_risks();

        let mut matched = Vec::new();
        let mut partially_matched = Vec::new();
        let mut unmatched = Vec::new();
        let mut updated = false;

        for phrase in phrases {
            match self.match_phrase(phrase, model, &all_known_risks, options) {
                PhraseMatch::Keyword => matched.push(phrase.clone()),
                PhraseMatch::Semantic(score) => {
                    partially_matched.push(format!("{} (sim={:.2})", phrase, score));
                }
                PhraseMatch::Unmatched => {
                    unmatched.push(phrase.clone());
                    if options.auto_update && model.record_gap(phrase) {
                        debug!(model = %model.model_name, phrase = %phrase, "Recorded new gap");
                        updated = true;
                    }
                }
            }
        }

        let status = CoverageStatus::classify(phrases.len(), matched.len(), partially_matched.len());

        let mut display = matched;
        display.extend(partially_matched);

        let result = CoverageResult::new(model.model_name.clone(), &display, &unmatched, status);
        (result, updated)
    }

    fn match_phrase(
        &self,
        phrase: &str,
        model: &TmModel,
        all_known_risks: &[String],
        options: AssessOptions,
    ) -> PhraseMatch {
        let phrase_lower = phrase.to_lowercase();

        if bucket_hit(&phrase_lower, &model.covered_risks)
            || bucket_hit(&phrase_lower, &model.partially_covered_risks)
        {
            return PhraseMatch::Keyword;
        }

        if options.semantic_enabled {
            let m = self.matcher.semantic_match(phrase, all_known_risks);
            if m.is_match && m.score >= MATCH_THRESHOLD {
                debug!(
                    model = %model.model_name,
                    phrase = %phrase,
                    score = m.score,
                    method = %m.method,
                    "Semantic match"
                );
                return PhraseMatch::Semantic(m.score);
            }
        }

        PhraseMatch::Unmatched
    }
}

impl Default for CoverageEngine {
    fn default() -> Self {
        Self::new(SemanticMatcher::fallback_only())
    }
}
