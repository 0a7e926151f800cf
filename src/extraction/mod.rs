//! Risk phrase extraction
//!
//! Produces the flat phrase list the coverage engine consumes. Keyword
//! heuristics always run; an LLM pass is optional and its failures fall back
//! to the heuristic result.

mod error;
mod extractor;
mod heuristics;
mod llm;
mod normalize;
mod text;

pub use error::ExtractionError;
pub use extractor::{ExtractionOutcome, RiskExtractor, LLM_PROMPT_CHARS, MAX_INPUT_CHARS};
pub use heuristics::{HeuristicExtractor, DEFAULT_RISK_KEYWORDS};
pub use llm::{
    build_prompt, parse_llm_output, LlmClient, OpenAiClient, StructuredExtraction, DEFAULT_LLM_MODEL,
};
pub use normalize::{normalize_phrases, RawPhrase};
pub use text::read_text_lossy;
