//! File-backed TM model store
//!
//! Every save writes a timestamped full copy next to the primary file before
//! the primary is replaced. Saves are not locked: concurrent runs against the
//! same path must be serialized by the caller.

use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::TmModel;

/// Location used when no path is configured
pub const DEFAULT_MODELS_PATH: &str = "models/tm_models.json";

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Error type for model store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read TM models from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TM model definitions in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize TM models: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    /// Missing or malformed definitions; fatal for an assessment run
    pub fn is_read_error(&self) -> bool {
        matches!(self, StoreError::Read { .. } | StoreError::Parse { .. })
    }

    /// Backup or primary write failed; fatal only for the persist step
    pub fn is_write_error(&self) -> bool {
        !self.is_read_error()
    }
}

/// Derive the backup location for `path` at `timestamp`.
///
/// `models/tm_models.json` at 2025-03-14 09:26:53 becomes
/// `models/tm_models_backup_20250314_092653.json`.
pub fn backup_path_for(path: &Path, timestamp: &DateTime<Local>) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = timestamp.format(BACKUP_TIMESTAMP_FORMAT);

    let file_name = match path.extension() {
        Some(ext) => format!("{}_backup_{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}_backup_{}", stem, stamp),
    };

    path.with_file_name(file_name)
}

/// Durable collection of TM model definitions
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all model definitions from the primary location
    pub fn load(&self) -> Result<Vec<TmModel>, StoreError> {
        Self::load_from(&self.path)
    }

    /// Load model definitions from an arbitrary file (e.g. a backup)
    pub fn load_from(path: &Path) -> Result<Vec<TmModel>, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let models: Vec<TmModel> =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Loaded {} TM models from {:?}", models.len(), path);
        Ok(models)
    }

    /// Back up, then overwrite the primary location.
    ///
    /// Creates a new backup on every call, so only call this after a mutation.
    /// Returns the path of the backup written.
    pub fn save(&self, models: &[TmModel]) -> Result<PathBuf, StoreError> {
        self.save_at(models, &Local::now())
    }

    /// `save` with an explicit backup timestamp
    pub fn save_at(
        &self,
        models: &[TmModel],
        timestamp: &DateTime<Local>,
    ) -> Result<PathBuf, StoreError> {
        let json = serde_json::to_string_pretty(models).map_err(StoreError::Serialize)?;

        let backup_path = backup_path_for(&self.path, timestamp);
        std::fs::write(&backup_path, &json).map_err(|source| StoreError::Write {
            path: backup_path.clone(),
            source,
        })?;
        debug!("Wrote TM model backup to {:?}", backup_path);

        self.replace_primary(&json)?;

        info!(
            "Saved {} TM models to {:?} (backup {:?})",
            models.len(),
            self.path,
            backup_path
        );
        Ok(backup_path)
    }

    /// Write to a sibling temp file and rename it over the primary
    fn replace_primary(&self, json: &str) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        // The temp file is created owner-only; carry over the primary's mode
        if let Ok(meta) = std::fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(write_err)?;
        }

        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS_PATH)
    }
}
