//! TM model definition

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One transaction-monitoring model and the risks it is believed to detect.
///
/// Buckets may overlap; nothing here enforces exclusivity. Absent buckets
/// deserialize as empty, and keys this crate does not own are carried through
/// `extra` so a save does not drop them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TmModel {
    pub model_name: String,

    #[serde(default)]
    pub covered_risks: Vec<String>,

    #[serde(default)]
    pub partially_covered_risks: Vec<String>,

    /// Known gaps; grows as assessments discover uncovered phrases
    #[serde(default)]
    pub not_covered_risks: Vec<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TmModel {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Default::default()
        }
    }

    pub fn with_covered<I, S>(mut self, risks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.covered_risks.extend(risks.into_iter().map(Into::into));
        self
    }

    pub fn with_partially_covered<I, S>(mut self, risks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partially_covered_risks
            .extend(risks.into_iter().map(Into::into));
        self
    }

    pub fn with_not_covered<I, S>(mut self, risks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.not_covered_risks
            .extend(risks.into_iter().map(Into::into));
        self
    }

    /// Union of all three buckets, in bucket order (covered, partial, gaps)
    pub fn all_known_risks(&self) -> Vec<String> {
        self.covered_risks
            .iter()
            .chain(&self.partially_covered_risks)
            .chain(&self.not_covered_risks)
            .cloned()
            .collect()
    }

    /// Record a gap unless the exact string is already present.
    ///
    /// Returns true if the gap list changed.
    pub fn record_gap(&mut self, phrase: &str) -> bool {
        if self.not_covered_risks.iter().any(|r| r == phrase) {
            return false;
        }
        self.not_covered_risks.push(phrase.to_string());
        true
    }
}
