//! The read-only document collection searched by the pipeline.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::PipelineError;
use crate::types::Document;

/// Validated, shared, immutable set of documents.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Arc<[Document]>,
}

impl Corpus {
    pub fn empty() -> Self {
        Self {
            documents: Arc::from(Vec::new()),
        }
    }

    /// Every id must be non-blank and unique.
    pub fn from_documents(documents: Vec<Document>) -> Result<Self, PipelineError> {
        let mut seen = HashSet::with_capacity(documents.len());
        for (idx, doc) in documents.iter().enumerate() {
            if doc.id.trim().is_empty() {
                return Err(PipelineError::MalformedDocument(format!(
                    "document at position {idx} has an empty id"
                )));
            }
            if !seen.insert(doc.id.as_str()) {
                return Err(PipelineError::MalformedDocument(format!(
                    "duplicate document id {:?}",
                    doc.id
                )));
            }
        }
        Ok(Self {
            documents: Arc::from(documents),
        })
    }

    /// Load a JSON (`.json`) or YAML (`.yaml`, `.yml`) array of documents.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| PipelineError::CorpusRead {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_err = |message: String| PipelineError::CorpusParse {
            path: path.to_path_buf(),
            message,
        };
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let documents: Vec<Document> = match extension.as_deref() {
            Some("json") => serde_json::from_str(&raw).map_err(|e| parse_err(e.to_string()))?,
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&raw).map_err(|e| parse_err(e.to_string()))?
            }
            other => {
                return Err(parse_err(format!(
                    "unsupported corpus format {:?}, expected .json, .yaml or .yml",
                    other.unwrap_or("")
                )));
            }
        };

        let corpus = Self::from_documents(documents)?;
        tracing::info!(path = %path.display(), documents = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    /// Built-in demo corpus about cross-lingual retrieval.
    pub fn sample() -> Self {
        let documents = vec![
            Document::new(
                "1",
                "Understanding Vector Space Models",
                "Vector space models represent text documents as vectors in a high-dimensional space. Each dimension corresponds to a term in the vocabulary, and the value represents the term's importance in the document.",
            ),
            Document::new(
                "2",
                "Cross-Language Information Retrieval",
                "CLIR systems enable users to search documents in one language using queries in another language. This is achieved through techniques like translation-based retrieval and cross-lingual embeddings.",
            ),
            Document::new(
                "3",
                "Query Translation Methods",
                "Dictionary-based translation and machine translation are two primary approaches for query translation in CLIR. Machine translation often provides better context-aware translations.",
            ),
            Document::new(
                "4",
                "Document Embedding Techniques",
                "Modern CLIR systems use multilingual document embeddings to create language-agnostic vector representations, enabling direct cross-lingual similarity comparison.",
            ),
            Document::new(
                "5",
                "Evaluation Metrics in IR",
                "Information retrieval systems are evaluated using metrics like precision, recall, and mean average precision (MAP). These metrics help assess both relevance and ranking quality.",
            ),
        ];
        Self {
            documents: Arc::from(documents),
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sample_corpus_is_valid() {
        let sample = Corpus::sample();
        assert_eq!(sample.len(), 5);
        assert!(Corpus::from_documents(sample.documents().to_vec()).is_ok());
    }

    #[test]
    fn rejects_blank_and_duplicate_ids() {
        let blank = vec![Document::new(" ", "t", "c")];
        assert!(matches!(
            Corpus::from_documents(blank),
            Err(PipelineError::MalformedDocument(_))
        ));

        let dupes = vec![Document::new("a", "t", "c"), Document::new("a", "t2", "c2")];
        let err = Corpus::from_documents(dupes).unwrap_err();
        assert!(err.to_string().contains("\"a\""));
    }

    #[test]
    fn loads_yaml_and_json() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(yaml, "- id: a\n  title: Alpha\n  content: First\n- id: b\n  title: Beta\n  content: Second").unwrap();
        assert_eq!(Corpus::from_path(yaml.path()).unwrap().len(), 2);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"[{{"id": "x", "title": "T", "content": "C"}}]"#).unwrap();
        let corpus = Corpus::from_path(json.path()).unwrap();
        assert_eq!(corpus.documents()[0].id, "x");
    }

    #[test]
    fn unknown_extension_and_missing_file() {
        let txt = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            Corpus::from_path(txt.path()),
            Err(PipelineError::CorpusParse { .. })
        ));
        assert!(matches!(
            Corpus::from_path("/no/such/corpus.json"),
            Err(PipelineError::CorpusRead { .. })
        ));
    }
}
