//! Load → assess → persist orchestration

use std::path::PathBuf;
use tracing::{error, info, instrument};

use super::engine::{AssessOptions, CoverageEngine};
use super::result::CoverageResult;
use crate::models::{ModelStore, StoreError};

/// What happened to the mutated model collection after a run
#[derive(Debug)]
pub enum PersistOutcome {
    /// Nothing changed, or auto-update was off
    NotNeeded,
    /// Models were written; a backup was taken first
    Saved { backup_path: PathBuf },
    /// The write failed; the run's results are still valid
    Failed(StoreError),
}

impl PersistOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PersistOutcome::Failed(_))
    }
}

/// Results of a full assessment run
#[derive(Debug)]
pub struct CoverageReport {
    pub results: Vec<CoverageResult>,
    pub updated: bool,
    pub persist: PersistOutcome,
}

/// Runs assessments against a model store
pub struct CoverageService {
    engine: CoverageEngine,
    store: ModelStore,
}

impl CoverageService {
    pub fn new(engine: CoverageEngine, store: ModelStore) -> Self {
        Self { engine, store }
    }

    pub fn engine(&self) -> &CoverageEngine {
        &self.engine
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Load models, assess `phrases`, and persist new gaps.
    ///
    /// A load failure aborts with no results. A save failure does not: it is
    /// reported through `CoverageReport::persist`.
    #[instrument(skip(self, phrases), fields(phrases = phrases.len(), store = ?self.store.path()))]
    pub fn run(
        &self,
        phrases: &[String],
        options: AssessOptions,
    ) -> Result<CoverageReport, StoreError> {
        let mut models = self.store.load()?;

        let run = self.engine.assess(phrases, &mut models, options);

        let persist = if options.auto_update && run.updated {
            match self.store.save(&models) {
                Ok(backup_path) => {
                    info!("TM models updated with new uncovered risks");
                    PersistOutcome::Saved { backup_path }
                }
                Err(e) => {
                    error!(error = %e, "Failed to persist TM model updates");
                    PersistOutcome::Failed(e)
                }
            }
        } else {
            PersistOutcome::NotNeeded
        };

        Ok(CoverageReport {
            results: run.results,
            updated: run.updated,
            persist,
        })
    }
}
