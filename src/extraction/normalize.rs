//! Normalize loosely-typed risk entries into plain phrases
//!
//! LLM output lists risks either as strings or as objects carrying a `risk`
//! key. Everything downstream sees only `String`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A risk entry as it arrives from an extractor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawPhrase {
    Text(String),
    Structured { risk: String },
    Other(Value),
}

impl RawPhrase {
    fn into_text(self) -> String {
        match self {
            RawPhrase::Text(s) => s,
            RawPhrase::Structured { risk } => risk,
            RawPhrase::Other(Value::Null) => String::new(),
            RawPhrase::Other(v) if is_falsy(&v) => String::new(),
            RawPhrase::Other(v) => v.to_string(),
        }
    }
}

/// `null`, `false`, zero and empty containers carry no phrase
fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

impl From<&str> for RawPhrase {
    fn from(s: &str) -> Self {
        RawPhrase::Text(s.to_string())
    }
}

impl From<String> for RawPhrase {
    fn from(s: String) -> Self {
        RawPhrase::Text(s)
    }
}

/// Flatten raw entries to trimmed, non-empty, de-duplicated phrases.
///
/// Keeps first-seen order; duplicates are exact-string after trimming.
pub fn normalize_phrases<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = RawPhrase>,
{
    let mut out: Vec<String> = Vec::new();
    for entry in raw {
        let text = entry.into_text();
        let trimmed = text.trim();
        if trimmed.is_empty() || out.iter().any(|p| p == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_entries_flatten() {
        let raw: Vec<RawPhrase> = serde_json::from_value(json!([
            "structuring",
            {"risk": "trade-based money laundering", "severity": "high"},
            "  fraud  ",
            "",
            null
        ]))
        .unwrap();

        assert_eq!(
            normalize_phrases(raw),
            vec!["structuring", "trade-based money laundering", "fraud"]
        );
    }

    #[test]
    fn test_duplicates_removed_in_order() {
        let raw = vec![
            RawPhrase::from("kyc"),
            RawPhrase::from("aml"),
            RawPhrase::from("kyc"),
        ];
        assert_eq!(normalize_phrases(raw), vec!["kyc", "aml"]);
    }

    #[test]
    fn test_case_variants_are_distinct() {
        let raw = vec![RawPhrase::from("Fraud"), RawPhrase::from("fraud")];
        assert_eq!(normalize_phrases(raw), vec!["Fraud", "fraud"]);
    }

    #[test]
    fn test_non_string_values_rendered() {
        let raw: Vec<RawPhrase> = serde_json::from_value(json!([42, {"name": "x"}, true])).unwrap();
        assert_eq!(normalize_phrases(raw), vec!["42", "{\"name\":\"x\"}", "true"]);
    }

    #[test]
    fn test_falsy_values_dropped() {
        let raw: Vec<RawPhrase> =
            serde_json::from_value(json!([0, 0.0, [], {}, false, null, "hawala"])).unwrap();
        assert_eq!(normalize_phrases(raw), vec!["hawala"]);
    }
}
