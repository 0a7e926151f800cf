//! Extraction errors

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("LLM client error: {0}")]
    LlmClient(String),

    #[error("LLM returned status {status}: {body}")]
    LlmStatus { status: u16, body: String },

    #[error("Failed to parse LLM response as JSON: {0}")]
    JsonParse(String),

    #[error("LLM not configured: {0}")]
    NotConfigured(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ExtractionError {
    fn from(e: reqwest::Error) -> Self {
        ExtractionError::LlmClient(e.to_string())
    }
}
