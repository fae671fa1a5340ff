//! Cosine-similarity ranking of the corpus against a query.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use semantic::{Embedder, SemanticError};
use tracing::warn;

use crate::corpus::Corpus;
use crate::types::{Document, Query, RankWarning};

/// Default bound on concurrent embedding calls per request.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Scored documents plus the ones that had to be skipped.
#[derive(Debug, Default)]
pub struct RankOutcome {
    /// Follows corpus order. Sorting is the aggregator's job.
    pub ranked: Vec<(Document, f32)>,
    pub warnings: Vec<RankWarning>,
}

/// Cosine similarity of two vectors.
///
/// Returns `None` when the lengths differ. A zero-norm input gives exactly
/// `0.0`, a non-finite result is mapped to `0.0`, and the value is clamped to
/// `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0f64, 0f64, 0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !score.is_finite() {
        return Some(0.0);
    }
    Some(score.clamp(-1.0, 1.0) as f32)
}

/// Scores every corpus document against a query with one embedding provider.
pub struct SimilarityRanker {
    embedder: Arc<dyn Embedder>,
    max_concurrency: usize,
}

impl SimilarityRanker {
    pub fn new(embedder: Arc<dyn Embedder>, max_concurrency: usize) -> Self {
        Self {
            embedder,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Score each document in `corpus` against `query`.
    ///
    /// Never fails: a failed query embedding yields an empty ranking with one
    /// warning, a failed document embedding drops just that document.
    pub async fn rank(&self, query: &Query, corpus: &Corpus) -> RankOutcome {
        let query_vec = match self.embedder.embed(query.text()).await {
            Ok(v) => v,
            Err(err) => {
                warn!(
                    provider = self.embedder.name(),
                    error = %err,
                    "query embedding failed, no corpus documents ranked"
                );
                return RankOutcome {
                    ranked: Vec::new(),
                    warnings: vec![RankWarning::query(err.to_string())],
                };
            }
        };

        let docs = corpus.documents();
        let doc_vecs = self.embed_documents(docs).await;

        let mut outcome = RankOutcome {
            ranked: Vec::with_capacity(docs.len()),
            warnings: Vec::new(),
        };
        for (doc, embedded) in docs.iter().zip(doc_vecs) {
            let reason = match embedded {
                Ok(doc_vec) => match cosine_similarity(&query_vec, &doc_vec) {
                    Some(score) => {
                        outcome.ranked.push((doc.clone(), score));
                        continue;
                    }
                    None => format!(
                        "embedding dimension {} does not match query dimension {}",
                        doc_vec.len(),
                        query_vec.len()
                    ),
                },
                Err(err) => err.to_string(),
            };
            warn!(document_id = %doc.id, reason = %reason, "document skipped during ranking");
            outcome.warnings.push(RankWarning::document(&doc.id, reason));
        }
        outcome
    }

    async fn embed_documents(&self, docs: &[Document]) -> Vec<Result<Vec<f32>, SemanticError>> {
        if docs.is_empty() {
            return Vec::new();
        }

        let texts: Vec<String> = docs.iter().map(Document::embedding_text).collect();
        if self.embedder.supports_batch() {
            match self.embedder.embed_batch(&texts).await {
                Ok(vectors) if vectors.len() == docs.len() => {
                    return vectors.into_iter().map(Ok).collect();
                }
                Ok(vectors) => warn!(
                    expected = docs.len(),
                    got = vectors.len(),
                    "batch embedding returned the wrong count, retrying per document"
                ),
                Err(err) => warn!(error = %err, "batch embedding failed, retrying per document"),
            }
        }

        let calls: Vec<_> = texts
            .iter()
            .map(|text| self.embedder.embed(text))
            .collect();
        stream::iter(calls)
            .buffered(self.max_concurrency.max(1))
            .collect()
            .await
    }
}
