//! Per-model coverage verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder rendered when a result column has no entries
pub const NONE_PLACEHOLDER: &str = "None";

/// Aggregate verdict for one TM model against one batch of phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoverageStatus {
    #[serde(rename = "Completely Covered")]
    CompletelyCovered,
    #[serde(rename = "Partially Covered")]
    PartiallyCovered,
    #[serde(rename = "Not Covered")]
    NotCovered,
    #[serde(rename = "No Risks Found")]
    NoRisksFound,
}

impl CoverageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageStatus::CompletelyCovered => "Completely Covered",
            CoverageStatus::PartiallyCovered => "Partially Covered",
            CoverageStatus::NotCovered => "Not Covered",
            CoverageStatus::NoRisksFound => "No Risks Found",
        }
    }

    /// Classify from match counts.
    ///
    /// `matched` counts substring matches against the covered and partially
    /// covered buckets; `partially_matched` counts semantic matches.
    pub fn classify(phrase_count: usize, matched: usize, partially_matched: usize) -> Self {
        if phrase_count > 0 && matched == phrase_count {
            CoverageStatus::CompletelyCovered
        } else if matched > 0 || partially_matched > 0 {
            CoverageStatus::PartiallyCovered
        } else if phrase_count == 0 {
            CoverageStatus::NoRisksFound
        } else {
            CoverageStatus::NotCovered
        }
    }
}

impl fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coverage of one TM model for one assessment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub model_name: String,
    /// Comma-joined matched phrases, semantic matches annotated with their score
    pub matched_risks: String,
    /// Comma-joined phrases left unmatched in this run
    pub newly_added_not_covered: String,
    pub coverage_status: CoverageStatus,
}

impl CoverageResult {
    pub fn new(
        model_name: impl Into<String>,
        matched: &[String],
        unmatched: &[String],
        coverage_status: CoverageStatus,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            matched_risks: join_or_none(matched),
            newly_added_not_covered: join_or_none(unmatched),
            coverage_status,
        }
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        NONE_PLACEHOLDER.to_string()
    } else {
        items.join(", ")
    }
}
