//! LLM-backed risk extraction
//!
//! The client is a trait so tests and alternative providers can stand in for
//! the OpenAI chat-completions API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ExtractionError;
use super::normalize::RawPhrase;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default chat model
pub const DEFAULT_LLM_MODEL: &str = "gpt-4.1";

const TEMPERATURE: f32 = 0.3;

/// Structured extraction result: risk names plus a short summary
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StructuredExtraction {
    #[serde(default)]
    pub risks: Vec<RawPhrase>,
    #[serde(default)]
    pub summary: String,
}

/// Trait for LLM client used by risk extraction
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single user prompt and return the raw text reply
    async fn complete(&self, prompt: &str) -> Result<String, ExtractionError>;

    /// Get the model name for logging
    fn model_name(&self) -> &str;
}

/// Prompt asking for AML/CFT risks and a summary as JSON
pub fn build_prompt(text: &str) -> String {
    format!(
        "You are an AML risk analysis assistant.\n\
         From the text below, extract potential AML/CFT risks and provide a short summary.\n\
         Respond strictly in JSON with keys: \"risks\" (list of risk names) and \"summary\" (paragraph).\n\
         \n\
         Text:\n\
         {}",
        text
    )
}

/// Parse a model reply, tolerating markdown code fences around the JSON
pub fn parse_llm_output(content: &str) -> Result<StructuredExtraction, ExtractionError> {
    let cleaned = content.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    serde_json::from_str(cleaned).map_err(|e| {
        let preview: String = cleaned.chars().take(200).collect();
        ExtractionError::JsonParse(format!("{}. Content: {}", e, preview))
    })
}

/// OpenAI chat-completions implementation of `LlmClient`
pub struct OpenAiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_LLM_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    /// Build from `OPENAI_API_KEY`; an empty key counts as unset
    pub fn from_env(model: Option<String>) -> Result<Self, ExtractionError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ExtractionError::NotConfigured("OPENAI_API_KEY not set"))?;
        Ok(match model {
            Some(model) => Self::with_model(api_key, model),
            None => Self::new(api_key),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ExtractionError> {
        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": prompt
            }],
            "temperature": TEMPERATURE
        });

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        chat_content(status, &body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Pull the first message's content out of a chat-completions reply.
///
/// Non-2xx replies become `LlmStatus` whatever the body looks like.
fn chat_content(status: u16, body: &str) -> Result<String, ExtractionError> {
    if !(200..300).contains(&status) {
        return Err(ExtractionError::LlmStatus {
            status,
            body: body.to_string(),
        });
    }

    let body: Value =
        serde_json::from_str(body).map_err(|e| ExtractionError::JsonParse(e.to_string()))?;

    body["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .and_then(|choice| choice["message"]["content"].as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| ExtractionError::LlmClient("Response had no message content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let out = parse_llm_output(r#"{"risks": ["hawala", "layering"], "summary": "Informal value transfer."}"#)
            .unwrap();
        assert_eq!(out.risks, vec![RawPhrase::from("hawala"), RawPhrase::from("layering")]);
        assert_eq!(out.summary, "Informal value transfer.");
    }

    #[test]
    fn test_parse_fenced_json_with_objects() {
        let content = "```json\n{\"risks\": [{\"risk\": \"trade misinvoicing\"}], \"summary\": \"\"}\n```";
        let out = parse_llm_output(content).unwrap();
        assert_eq!(
            out.risks,
            vec![RawPhrase::Structured {
                risk: "trade misinvoicing".into()
            }]
        );
    }

    #[test]
    fn test_parse_missing_keys_default() {
        let out = parse_llm_output("{}").unwrap();
        assert!(out.risks.is_empty());
        assert!(out.summary.is_empty());
    }

    #[test]
    fn test_parse_prose_is_error() {
        let err = parse_llm_output("I could not find any risks.").unwrap_err();
        assert!(matches!(err, ExtractionError::JsonParse(_)));
    }

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_prompt("Shell companies in free zones");
        assert!(prompt.starts_with("You are an AML risk analysis assistant."));
        assert!(prompt.ends_with("Text:\nShell companies in free zones"));
    }

    #[test]
    fn test_chat_content_extracts_message() {
        let body = r#"{"choices": [{"message": {"content": "  {\"risks\": []}  "}}]}"#;
        assert_eq!(chat_content(200, body).unwrap(), r#"{"risks": []}"#);
    }

    #[test]
    fn test_chat_content_html_error_page_keeps_status() {
        let body = "<html><body>502 Bad Gateway</body></html>";
        match chat_content(502, body) {
            Err(ExtractionError::LlmStatus { status, body: b }) => {
                assert_eq!(status, 502);
                assert!(b.contains("Bad Gateway"));
            }
            other => panic!("Expected LlmStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_chat_content_without_choices() {
        assert!(matches!(
            chat_content(200, r#"{"choices": []}"#),
            Err(ExtractionError::LlmClient(_))
        ));
        assert!(matches!(
            chat_content(200, "not json"),
            Err(ExtractionError::JsonParse(_))
        ));
    }
}
