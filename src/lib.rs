//! Cross-lingual retrieval (CLIR) core.
//!
//! Given a free-text query this crate ranks a small corpus by embedding
//! similarity, translates the surviving hits into a target language, and
//! merges in records produced by an offline auxiliary step. The result is a
//! score-ordered, size-bounded list with stable tie-breaking.
//!
//! Stages, leaves first:
//!
//! - [`ranker`] - cosine similarity between query and `title + " " + content`
//! - [`translation`] - score gate plus soft-failing translation
//! - [`builder`] - packages a document into a [`SearchResult`]
//! - [`auxiliary`] - precomputed results from outside the request path
//! - [`aggregate`] - merge, stable sort, dedupe, truncate to top K
//! - [`pipeline`] - wires the stages together per request
//!
//! Providers come from the `semantic` and `translate` crates and are injected
//! as trait objects, so tests can swap in fakes.
//!
//! ```no_run
//! use std::sync::Arc;
//! use clir::{Corpus, NoAuxiliary, PipelineConfig, SearchOptions, SearchPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), clir::PipelineError> {
//!     let cfg = PipelineConfig::default();
//!     let pipeline = SearchPipeline::from_config(&cfg, Corpus::sample(), Arc::new(NoAuxiliary))?;
//!     let outcome = pipeline.search("query translation", SearchOptions::default()).await?;
//!     for r in outcome.results {
//!         println!("{:.3} {} {:?}", r.relevance_score, r.title, r.translated_title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod auxiliary;
pub mod builder;
pub mod config;
pub mod corpus;
mod error;
pub mod metrics;
pub mod pipeline;
pub mod ranker;
pub mod translation;
pub mod types;

pub use aggregate::{Aggregation, aggregate, aggregate_with_report};
pub use auxiliary::{AuxiliaryError, AuxiliarySource, JsonFileAuxiliary, NoAuxiliary, StaticAuxiliary};
pub use builder::build;
pub use config::{ConfigLoadError, PipelineConfig, SearchSection, TranslationSection};
pub use corpus::Corpus;
pub use error::PipelineError;
pub use metrics::{NoopMetrics, PipelineMetrics, ProviderKind};
pub use pipeline::{PipelineInfo, SearchOptions, SearchOutcome, SearchPipeline, SearchSettings};
pub use ranker::{RankOutcome, SimilarityRanker, cosine_similarity};
pub use translation::{TranslateThreshold, TranslatedFields, TranslationPolicy};
pub use types::{
    DedupePolicy, Document, Query, RankWarning, ResultSource, SearchResult, SearchWarning, TopK,
};

pub use semantic::{self, Embedder, SemanticConfig, SemanticError};
pub use translate::{self, LangCode, TranslateConfig, TranslateError, Translator};
