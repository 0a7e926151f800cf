//! Heuristic + LLM extraction pipeline

use std::sync::Arc;
use tracing::{info, warn};

use super::heuristics::HeuristicExtractor;
use super::llm::{build_prompt, parse_llm_output, LlmClient, StructuredExtraction};
use super::normalize::{normalize_phrases, RawPhrase};

/// Input is cut to this many characters before any processing
pub const MAX_INPUT_CHARS: usize = 8000;

/// Characters of the input included in the LLM prompt
pub const LLM_PROMPT_CHARS: usize = 7000;

/// Extraction result
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    /// What the LLM (or, without one, the heuristics) reported, risks normalized
    pub structured: StructuredExtraction,
    /// Phrases handed to the coverage engine
    pub phrases: Vec<String>,
}

/// Extracts risk phrases from document text
pub struct RiskExtractor {
    heuristics: HeuristicExtractor,
    llm: Option<Arc<dyn LlmClient>>,
}

impl RiskExtractor {
    pub fn new(heuristics: HeuristicExtractor, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { heuristics, llm }
    }

    /// Heuristics only
    pub fn heuristic_only(heuristics: HeuristicExtractor) -> Self {
        Self::new(heuristics, None)
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Extract risk phrases from `text`.
    ///
    /// Heuristics always run. With `use_llm` and a configured client, the
    /// LLM's structured reply replaces the heuristic one; any LLM failure is
    /// recorded in the summary and the heuristic result stands.
    pub async fn extract(&self, text: &str, use_llm: bool) -> ExtractionOutcome {
        let text = truncate_chars(text, MAX_INPUT_CHARS);

        let heuristic: Vec<String> = self.heuristics.extract(text);
        let mut structured = StructuredExtraction {
            risks: heuristic.iter().cloned().map(RawPhrase::Text).collect(),
            summary: String::new(),
        };

        if use_llm {
            if let Some(llm) = &self.llm {
                let prompt = build_prompt(truncate_chars(text, LLM_PROMPT_CHARS));
                let reply = llm.complete(&prompt).await;
                match reply.and_then(|content| parse_llm_output(&content)) {
                    Ok(parsed) => {
                        info!(
                            model = llm.model_name(),
                            risks = parsed.risks.len(),
                            "LLM extraction succeeded"
                        );
                        structured = parsed;
                    }
                    Err(e) => {
                        warn!(model = llm.model_name(), error = %e, "LLM extraction failed, using heuristics");
                        structured.summary = format!("LLM fallback due to error: {}", e);
                    }
                }
            }
        }

        let merged = structured
            .risks
            .iter()
            .cloned()
            .chain(heuristic.into_iter().map(RawPhrase::Text));
        let phrases = normalize_phrases(merged);

        structured.risks = phrases.iter().cloned().map(RawPhrase::Text).collect();

        ExtractionOutcome {
            structured,
            phrases,
        }
    }
}

/// Prefix of at most `max` characters, cut on a char boundary
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_boundary() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }
}
