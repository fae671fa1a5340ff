use std::path::PathBuf;

use thiserror::Error;

/// Errors that can escape the search pipeline.
///
/// Provider failures never show up here. They are absorbed into warnings,
/// missing translations, or an empty auxiliary list.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Client input was unusable (empty query, bad per-request option).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A document or result record is missing required fields.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to read corpus {path}: {source}")]
    CorpusRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse corpus {path}: {message}")]
    CorpusParse { path: PathBuf, message: String },
}

impl PipelineError {
    /// Whether the error was caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::InvalidQuery(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invalid_query_is_client_error() {
        assert!(PipelineError::InvalidQuery("empty".into()).is_client_error());
        assert!(!PipelineError::MalformedDocument("x".into()).is_client_error());
        assert!(!PipelineError::InvalidConfiguration("k".into()).is_client_error());
    }

    #[test]
    fn corpus_errors_name_the_file() {
        let err = PipelineError::CorpusParse {
            path: "docs.yaml".into(),
            message: "expected a sequence".into(),
        };
        assert!(err.to_string().contains("docs.yaml"));
    }
}
