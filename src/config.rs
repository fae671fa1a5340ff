//! YAML configuration for the search pipeline.
//!
//! One file describes ranking, translation, and both providers. Every section
//! is optional and falls back to its defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # CLIR Pipeline Configuration
//! version: "1.0"
//!
//! search:
//!   top_k: 5
//!   dedupe: keep_highest     # or: none
//!   max_concurrency: 8
//!
//! translation:
//!   target_lang: hi
//!   threshold: always        # or: never, or a score such as 0.5
//!
//! semantic:
//!   mode: hashing            # or: api
//!   dimension: 384
//!
//! translate:
//!   mode: dictionary         # or: api, disabled
//!   source_lang: en
//! ```

use std::fs;
use std::path::Path;

use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use translate::{LangCode, TranslateConfig};

use crate::PipelineError;
use crate::ranker::DEFAULT_MAX_CONCURRENCY;
use crate::translation::TranslateThreshold;
use crate::types::{DedupePolicy, TopK};

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

impl From<ConfigLoadError> for PipelineError {
    fn from(err: ConfigLoadError) -> Self {
        PipelineError::InvalidConfiguration(err.to_string())
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub search: SearchSection,

    #[serde(default)]
    pub translation: TranslationSection,

    /// Embedding provider
    #[serde(default)]
    pub semantic: SemanticConfig,

    /// Translation provider
    #[serde(default)]
    pub translate: TranslateConfig,
}

impl PipelineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Pull provider URLs and tokens from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        self.semantic = self.semantic.with_env_overrides();
        self.translate = self.translate.with_env_overrides();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.search.validate()?;
        self.semantic
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.translate
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            search: SearchSection::default(),
            translation: TranslationSection::default(),
            semantic: SemanticConfig::default(),
            translate: TranslateConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchSection {
    /// Results returned per search
    #[serde(default)]
    pub top_k: TopK,

    #[serde(default)]
    pub dedupe: DedupePolicy,

    /// Concurrent provider calls per request
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl SearchSection {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.max_concurrency == 0 {
            return Err(ConfigLoadError::Validation(
                "search.max_concurrency must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            top_k: TopK::default(),
            dedupe: DedupePolicy::default(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationSection {
    #[serde(default)]
    pub target_lang: LangCode,

    #[serde(default)]
    pub threshold: TranslateThreshold,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}
