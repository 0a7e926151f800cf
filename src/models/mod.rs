//! Transaction-monitoring model definitions
//!
//! This module provides:
//! - The `TmModel` keyword-bucket definition
//! - File-backed storage with backup-before-overwrite

mod store;
mod tm_model;

pub use store::{backup_path_for, ModelStore, StoreError, DEFAULT_MODELS_PATH};
pub use tm_model::TmModel;
