//! TM coverage assessment for AML/CFT regulatory risks
//!
//! Extracts risk-indicator phrases from regulatory text and scores how well
//! a set of transaction-monitoring (TM) model definitions covers them.
//!
//! ```text
//! document text ──► extraction (heuristics + optional LLM)
//!                        │ phrases
//!                        ▼
//!                  CoverageEngine ◄── SemanticMatcher (embeddings | substring)
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            ▼
//!   CoverageResult per model      new gaps → ModelStore (backup, then write)
//! ```

pub mod config;
pub mod coverage;
pub mod extraction;
pub mod models;

pub use config::{ConfigError, CoverageConfig};
pub use coverage::{
    AssessOptions, CoverageEngine, CoverageReport, CoverageResult, CoverageRun, CoverageService,
    CoverageStatus, PersistOutcome,
};
pub use extraction::{ExtractionError, ExtractionOutcome, RiskExtractor};
pub use models::{ModelStore, StoreError, TmModel};

pub use tm_semantic_matcher::{SemanticMatcher, SimilarityScorer};
