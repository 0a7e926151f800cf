//! Runtime configuration
//!
//! Loaded from an optional YAML file, then overridden from the environment:
//!
//! | Variable         | Field              |
//! |------------------|--------------------|
//! | `TM_MODELS_PATH` | `models_path`      |
//! | `TM_SEMANTIC`    | `semantic_enabled` |
//! | `TM_AUTO_UPDATE` | `auto_update`      |
//! | `TM_LLM_MODEL`   | `llm_model`        |
//!
//! `OPENAI_API_KEY` is read by the LLM client itself, never stored here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coverage::AssessOptions;
use crate::extraction::{HeuristicExtractor, DEFAULT_LLM_MODEL};
use crate::models::DEFAULT_MODELS_PATH;
use tm_semantic_matcher::{MatcherConfig, DEFAULT_MATCH_THRESHOLD, DEFAULT_MODEL};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid boolean for {var}: '{value}'")]
    InvalidBool { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub models_path: PathBuf,
    pub semantic_enabled: bool,
    pub auto_update: bool,
    pub llm_enabled: bool,
    pub llm_model: String,
    pub embedding_model: String,
    /// Replaces the built-in heuristic keyword list when set
    pub risk_keywords: Option<Vec<String>>,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            models_path: PathBuf::from(DEFAULT_MODELS_PATH),
            semantic_enabled: true,
            auto_update: true,
            llm_enabled: false,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            embedding_model: DEFAULT_MODEL.to_string(),
            risk_keywords: None,
        }
    }
}

impl CoverageConfig {
    /// Load from `path` (if any), then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Apply overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TM_MODELS_PATH") {
            self.models_path = PathBuf::from(path);
        }
        if let Some(v) = lookup("TM_SEMANTIC") {
            self.semantic_enabled = parse_bool("TM_SEMANTIC", &v)?;
        }
        if let Some(v) = lookup("TM_AUTO_UPDATE") {
            self.auto_update = parse_bool("TM_AUTO_UPDATE", &v)?;
        }
        if let Some(model) = lookup("TM_LLM_MODEL") {
            self.llm_model = model;
        }
        Ok(())
    }

    pub fn assess_options(&self) -> AssessOptions {
        AssessOptions {
            semantic_enabled: self.semantic_enabled,
            auto_update: self.auto_update,
        }
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            model_name: self.embedding_model.clone(),
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    pub fn heuristics(&self) -> HeuristicExtractor {
        match &self.risk_keywords {
            Some(keywords) => HeuristicExtractor::new(keywords.iter().cloned()),
            None => HeuristicExtractor::builtin().clone(),
        }
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
