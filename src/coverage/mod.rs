//! Coverage assessment engine
//!
//! Reconciles free-text risk phrases against each TM model's keyword buckets:
//!
//! ```text
//! phrase ──► covered bucket (substring, either direction) ──► matched
//!        └─► partially covered bucket (same rule) ──────────► matched
//!        └─► semantic score vs all known risks >= 0.70 ─────► partially_matched
//!        └─► otherwise ─────────────────────────────────────► gap (optionally persisted)
//! ```

mod engine;
mod report;
mod result;
mod service;

pub use engine::{bidirectional_contains, AssessOptions, CoverageEngine, CoverageRun, MATCH_THRESHOLD};
pub use report::{status_distribution, write_csv, CSV_HEADERS};
pub use result::{CoverageResult, CoverageStatus, NONE_PLACEHOLDER};
pub use service::{CoverageReport, CoverageService, PersistOutcome};
