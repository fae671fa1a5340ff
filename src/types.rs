//! Data shared by every pipeline stage.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// A corpus document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Text handed to the embedding provider: `title + " " + content`.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// A validated, non-empty search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
}

impl Query {
    /// Trim `raw` and reject it when nothing is left.
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(PipelineError::InvalidQuery(
                "Search query cannot be empty".into(),
            ));
        }
        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Where a result came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Corpus,
    #[default]
    Auxiliary,
}

/// One entry of the search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_content: Option<String>,
    pub relevance_score: f32,
    #[serde(default)]
    pub source: ResultSource,
}

/// Maximum number of results returned. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TopK(NonZeroUsize);

impl TopK {
    pub const DEFAULT: TopK = TopK(NonZeroUsize::MIN.saturating_add(4));

    pub fn new(k: usize) -> Result<Self, PipelineError> {
        NonZeroUsize::new(k)
            .map(TopK)
            .ok_or_else(|| PipelineError::InvalidConfiguration("top_k must be at least 1".into()))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for TopK {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for TopK {
    type Error = PipelineError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TopK> for usize {
    fn from(k: TopK) -> Self {
        k.get()
    }
}

/// What to do when ranked and auxiliary results share an id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupePolicy {
    /// Keep one record per id: highest score, earlier copy on ties.
    #[default]
    KeepHighest,
    /// Keep every record.
    None,
}

/// A document left out of ranking because the embedding provider failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankWarning {
    /// `None` when the query embedding itself failed.
    pub document_id: Option<String>,
    pub reason: String,
}

impl RankWarning {
    pub fn query(reason: impl Into<String>) -> Self {
        Self {
            document_id: None,
            reason: reason.into(),
        }
    }

    pub fn document(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            document_id: Some(id.into()),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RankWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.document_id {
            Some(id) => write!(f, "document {id} skipped: {}", self.reason),
            None => write!(f, "query embedding failed: {}", self.reason),
        }
    }
}

/// Non-fatal problems collected while serving one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchWarning {
    Rank(RankWarning),
    AuxiliaryUnavailable { reason: String },
    AuxiliaryRecordDropped { id: String, reason: String },
}

impl fmt::Display for SearchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchWarning::Rank(w) => w.fmt(f),
            SearchWarning::AuxiliaryUnavailable { reason } => {
                write!(f, "auxiliary results unavailable: {reason}")
            }
            SearchWarning::AuxiliaryRecordDropped { id, reason } => {
                write!(f, "auxiliary record {id:?} dropped: {reason}")
            }
        }
    }
}
