//! Keyword heuristics for AML/CFT risk indicators

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Built-in AML/CFT indicator keywords
pub const DEFAULT_RISK_KEYWORDS: &[&str] = &[
    "money laundering",
    "terrorism financing",
    "suspicious transaction",
    "kyc",
    "aml",
    "risk assessment",
    "high-risk",
    "threshold",
    "alert",
    "structuring",
    "fraud",
    "sanction",
    "shell company",
    "beneficial owner",
    "wire transfer",
    "cross-border",
    "politically exposed",
    "bribery",
    "corruption",
    "tax evasion",
    "hawala",
    "unusual transaction",
    "cash deposit",
    "front company",
    "smurfing",
    "layering",
    "integration",
];

static DEFAULT_EXTRACTOR: Lazy<HeuristicExtractor> = Lazy::new(|| {
    HeuristicExtractor::new(DEFAULT_RISK_KEYWORDS.iter().map(|s| s.to_string()))
});

/// Whole-word, case-insensitive keyword spotter
#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    patterns: Vec<(String, Regex)>,
}

impl HeuristicExtractor {
    /// Build from a keyword list; keywords that fail to compile are skipped
    pub fn new<I>(keywords: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let patterns = keywords
            .into_iter()
            .filter_map(|kw| {
                let pattern = format!(r"\b{}\b", regex::escape(&kw));
                match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                    Ok(re) => Some((kw, re)),
                    Err(e) => {
                        warn!(keyword = %kw, error = %e, "Skipping unusable risk keyword");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// Extractor over `DEFAULT_RISK_KEYWORDS`
    pub fn builtin() -> &'static HeuristicExtractor {
        &DEFAULT_EXTRACTOR
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(kw, _)| kw.as_str())
    }

    /// Keywords occurring in `text`, in keyword-list order
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(kw, _)| kw.clone())
            .collect()
    }
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
