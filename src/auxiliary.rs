//! Precomputed results produced outside the request path (for example by an
//! offline analysis job) and merged into every search.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::SearchResult;

#[derive(Debug, Error)]
pub enum AuxiliaryError {
    #[error("failed to read auxiliary results {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse auxiliary results {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Supplies extra results for a query.
///
/// Records are taken as-is: scores are not recomputed and translations are
/// not filled in. Errors are turned into an empty list by the caller.
#[async_trait]
pub trait AuxiliarySource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, query_text: &str) -> Result<Vec<SearchResult>, AuxiliaryError>;
}

/// No auxiliary results.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuxiliary;

#[async_trait]
impl AuxiliarySource for NoAuxiliary {
    fn name(&self) -> &str {
        "none"
    }

    async fn fetch(&self, _query_text: &str) -> Result<Vec<SearchResult>, AuxiliaryError> {
        Ok(Vec::new())
    }
}

/// Fixed in-memory records returned for every query.
#[derive(Debug, Clone, Default)]
pub struct StaticAuxiliary {
    records: Vec<SearchResult>,
}

impl StaticAuxiliary {
    pub fn new(records: Vec<SearchResult>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl AuxiliarySource for StaticAuxiliary {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, _query_text: &str) -> Result<Vec<SearchResult>, AuxiliaryError> {
        Ok(self.records.clone())
    }
}

/// JSON array of result records on disk, re-read on every fetch so a
/// background job can rewrite it while the service runs.
#[derive(Debug, Clone)]
pub struct JsonFileAuxiliary {
    path: PathBuf,
    match_query: bool,
}

impl JsonFileAuxiliary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            match_query: false,
        }
    }

    /// Only return records whose title or content mention a query term.
    pub fn with_match_query(mut self, enabled: bool) -> Self {
        self.match_query = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuxiliarySource for JsonFileAuxiliary {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn fetch(&self, query_text: &str) -> Result<Vec<SearchResult>, AuxiliaryError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| AuxiliaryError::Read {
                path: self.path.clone(),
                source,
            })?;
        let records: Vec<SearchResult> =
            serde_json::from_str(&raw).map_err(|e| AuxiliaryError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        if !self.match_query {
            return Ok(records);
        }

        let terms = query_terms(query_text);
        Ok(records
            .into_iter()
            .filter(|r| mentions_any(r, &terms))
            .collect())
    }
}

fn query_terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn mentions_any(record: &SearchResult, terms: &[String]) -> bool {
    let title = record.title.to_lowercase();
    let content = record.content.to_lowercase();
    terms
        .iter()
        .any(|t| title.contains(t.as_str()) || content.contains(t.as_str()))
}
