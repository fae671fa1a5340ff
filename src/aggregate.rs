//! Merging ranked and auxiliary results into the final top-K list.

use std::collections::HashSet;

use tracing::warn;

use crate::PipelineError;
use crate::types::{DedupePolicy, SearchResult, SearchWarning, TopK};

/// Final list plus the auxiliary records rejected by the shape check.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub results: Vec<SearchResult>,
    pub warnings: Vec<SearchWarning>,
}

/// Merge, sort, dedupe and truncate. See [`aggregate_with_report`].
pub fn aggregate(
    ranked: Vec<SearchResult>,
    auxiliary: Vec<SearchResult>,
    k: TopK,
    dedupe: DedupePolicy,
) -> Result<Vec<SearchResult>, PipelineError> {
    aggregate_with_report(ranked, auxiliary, k, dedupe).map(|a| a.results)
}

/// Merge `ranked` then `auxiliary`, sort by score descending, apply `dedupe`
/// and keep the first `k`.
///
/// The sort is stable so equal scores keep their input order, ranked entries
/// first. Scores are never recomputed. Auxiliary records with a blank id or a
/// non-finite score are dropped with a warning; the same defect in a ranked
/// record is an error.
pub fn aggregate_with_report(
    ranked: Vec<SearchResult>,
    auxiliary: Vec<SearchResult>,
    k: TopK,
    dedupe: DedupePolicy,
) -> Result<Aggregation, PipelineError> {
    let mut warnings = Vec::new();
    let mut combined = Vec::with_capacity(ranked.len() + auxiliary.len());

    for result in ranked {
        if let Some(reason) = shape_defect(&result) {
            return Err(PipelineError::MalformedDocument(format!(
                "ranked result {:?}: {reason}",
                result.id
            )));
        }
        combined.push(result);
    }

    for result in auxiliary {
        match shape_defect(&result) {
            Some(reason) => {
                warn!(id = %result.id, reason, "dropping auxiliary record");
                warnings.push(SearchWarning::AuxiliaryRecordDropped {
                    id: result.id,
                    reason: reason.to_string(),
                });
            }
            None => combined.push(result),
        }
    }

    combined.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

    if dedupe == DedupePolicy::KeepHighest {
        let mut seen = HashSet::with_capacity(combined.len());
        combined.retain(|r| seen.insert(r.id.clone()));
    }

    combined.truncate(k.get());
    Ok(Aggregation {
        results: combined,
        warnings,
    })
}

fn shape_defect(result: &SearchResult) -> Option<&'static str> {
    if result.id.trim().is_empty() {
        Some("empty id")
    } else if !result.relevance_score.is_finite() {
        Some("non-finite relevance score")
    } else {
        None
    }
}
