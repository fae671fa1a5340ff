use crate::PipelineError;
use crate::types::{Document, ResultSource, SearchResult};

/// Package a ranked corpus document into a response record.
pub fn build(
    document: &Document,
    score: f32,
    translated_title: Option<String>,
    translated_content: Option<String>,
) -> Result<SearchResult, PipelineError> {
    if document.id.trim().is_empty() {
        return Err(PipelineError::MalformedDocument(format!(
            "document titled {:?} has an empty id",
            document.title
        )));
    }

    Ok(SearchResult {
        id: document.id.clone(),
        title: document.title.clone(),
        content: document.content.clone(),
        translated_title,
        translated_content,
        relevance_score: score,
        source: ResultSource::Corpus,
    })
}
