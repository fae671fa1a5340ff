//! End-to-end search: rank, fetch auxiliary results, merge, translate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use semantic::Embedder;
use serde::Serialize;
use tracing::{info, warn};
use translate::{LangCode, Translator};

use crate::PipelineError;
use crate::aggregate::aggregate_with_report;
use crate::auxiliary::AuxiliarySource;
use crate::builder::build;
use crate::config::PipelineConfig;
use crate::corpus::Corpus;
use crate::metrics::{NoopMetrics, PipelineMetrics, ProviderKind};
use crate::ranker::{DEFAULT_MAX_CONCURRENCY, SimilarityRanker};
use crate::translation::{TranslateThreshold, TranslationPolicy};
use crate::types::{DedupePolicy, Document, Query, ResultSource, SearchResult, SearchWarning, TopK};

/// Process-wide search settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub top_k: TopK,
    pub dedupe: DedupePolicy,
    pub max_concurrency: usize,
    pub target_lang: LangCode,
    pub threshold: TranslateThreshold,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            top_k: TopK::default(),
            dedupe: DedupePolicy::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            target_lang: LangCode::default(),
            threshold: TranslateThreshold::default(),
        }
    }
}

impl From<&PipelineConfig> for SearchSettings {
    fn from(cfg: &PipelineConfig) -> Self {
        Self {
            top_k: cfg.search.top_k,
            dedupe: cfg.search.dedupe,
            max_concurrency: cfg.search.max_concurrency,
            target_lang: cfg.translation.target_lang.clone(),
            threshold: cfg.translation.threshold,
        }
    }
}

/// Per-request overrides. Invalid values are the caller's fault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub top_k: Option<usize>,
    pub target_lang: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub warnings: Vec<SearchWarning>,
}

/// Static facts about a pipeline, for readiness reporting.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineInfo {
    pub corpus_documents: usize,
    pub embedder: String,
    pub translator: String,
    pub auxiliary: String,
    pub top_k: usize,
    pub dedupe: DedupePolicy,
    pub target_lang: String,
    pub translate_threshold: String,
}

pub struct SearchPipeline {
    corpus: Corpus,
    ranker: SimilarityRanker,
    policy: TranslationPolicy,
    auxiliary: Arc<dyn AuxiliarySource>,
    metrics: Arc<dyn PipelineMetrics>,
    settings: SearchSettings,
}

impl SearchPipeline {
    pub fn new(
        corpus: Corpus,
        embedder: Arc<dyn Embedder>,
        translator: Arc<dyn Translator>,
        auxiliary: Arc<dyn AuxiliarySource>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            corpus,
            ranker: SimilarityRanker::new(embedder, settings.max_concurrency),
            policy: TranslationPolicy::new(translator, settings.threshold),
            auxiliary,
            metrics: Arc::new(NoopMetrics),
            settings,
        }
    }

    /// Build both providers from `cfg`.
    pub fn from_config(
        cfg: &PipelineConfig,
        corpus: Corpus,
        auxiliary: Arc<dyn AuxiliarySource>,
    ) -> Result<Self, PipelineError> {
        let embedder = semantic::build_embedder(&cfg.semantic)
            .map_err(|e| PipelineError::InvalidConfiguration(e.to_string()))?;
        let translator = translate::build_translator(&cfg.translate)
            .map_err(|e| PipelineError::InvalidConfiguration(e.to_string()))?;
        Ok(Self::new(corpus, embedder, translator, auxiliary, cfg.into()))
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn info(&self) -> PipelineInfo {
        PipelineInfo {
            corpus_documents: self.corpus.len(),
            embedder: self.ranker.embedder_name().to_string(),
            translator: self.policy.translator_name().to_string(),
            auxiliary: self.auxiliary.name().to_string(),
            top_k: self.settings.top_k.get(),
            dedupe: self.settings.dedupe,
            target_lang: self.settings.target_lang.to_string(),
            translate_threshold: self.settings.threshold.to_string(),
        }
    }

    /// Run one search.
    ///
    /// Fails only on unusable input (`InvalidQuery`) or a malformed ranked
    /// record. Provider failures surface as `warnings`, missing translations,
    /// or missing auxiliary results.
    pub async fn search(
        &self,
        raw_query: &str,
        options: SearchOptions,
    ) -> Result<SearchOutcome, PipelineError> {
        let start = Instant::now();
        let (query, k, target) = match self.validate_request(raw_query, options) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.metrics.record_rejected();
                return Err(err);
            }
        };

        let (rank, auxiliary) = tokio::join!(
            self.ranker.rank(&query, &self.corpus),
            self.fetch_auxiliary(&query)
        );

        let mut warnings: Vec<SearchWarning> = Vec::new();
        for w in rank.warnings {
            self.metrics.record_provider_failure(ProviderKind::Embedding);
            warnings.push(SearchWarning::Rank(w));
        }
        let auxiliary = auxiliary.unwrap_or_else(|reason| {
            warnings.push(SearchWarning::AuxiliaryUnavailable { reason });
            Vec::new()
        });

        let ranked_count = rank.ranked.len();
        let built = rank
            .ranked
            .iter()
            .map(|(doc, score)| build(doc, *score, None, None))
            .collect::<Result<Vec<_>, _>>()?;

        let merged = aggregate_with_report(built, auxiliary, k, self.settings.dedupe)?;
        warnings.extend(merged.warnings);

        // Only results that survived truncation are worth a translation call.
        let documents: HashMap<&str, &Document> = rank
            .ranked
            .iter()
            .map(|(doc, _)| (doc.id.as_str(), doc))
            .collect();
        let results = self.translate_results(merged.results, &documents, &target).await;

        let latency = start.elapsed();
        self.metrics
            .record_search(latency, ranked_count, results.len(), warnings.len());
        info!(
            query_len = query.text().len(),
            ranked = ranked_count,
            returned = results.len(),
            warnings = warnings.len(),
            target_lang = %target,
            latency_ms = latency.as_millis() as u64,
            "search completed"
        );

        Ok(SearchOutcome { results, warnings })
    }

    fn validate_request(
        &self,
        raw_query: &str,
        options: SearchOptions,
    ) -> Result<(Query, TopK, LangCode), PipelineError> {
        let query = Query::parse(raw_query)?;
        let k = match options.top_k {
            Some(n) => TopK::new(n)
                .map_err(|_| PipelineError::InvalidQuery("top_k must be at least 1".into()))?,
            None => self.settings.top_k,
        };
        let target = match options.target_lang.as_deref() {
            Some(raw) => LangCode::parse(raw)
                .map_err(|e| PipelineError::InvalidQuery(e.to_string()))?,
            None => self.settings.target_lang.clone(),
        };
        Ok((query, k, target))
    }

    async fn fetch_auxiliary(&self, query: &Query) -> Result<Vec<SearchResult>, String> {
        match self.auxiliary.fetch(query.text()).await {
            Ok(mut records) => {
                for r in &mut records {
                    r.source = ResultSource::Auxiliary;
                }
                Ok(records)
            }
            Err(err) => {
                warn!(source = self.auxiliary.name(), error = %err, "auxiliary results unavailable");
                self.metrics.record_provider_failure(ProviderKind::Auxiliary);
                Err(err.to_string())
            }
        }
    }

    async fn translate_results(
        &self,
        results: Vec<SearchResult>,
        documents: &HashMap<&str, &Document>,
        target: &LangCode,
    ) -> Vec<SearchResult> {
        // Pair each result with its owned document before building futures so
        // the stream holds no closure borrows.
        let jobs: Vec<(SearchResult, Option<Document>)> = results
            .into_iter()
            .map(|result| {
                let doc = match result.source {
                    ResultSource::Corpus => documents.get(result.id.as_str()).map(|d| (*d).clone()),
                    _ => None,
                };
                (result, doc)
            })
            .collect();

        let calls: Vec<_> = jobs
            .into_iter()
            .map(|(result, doc)| self.translate_one(result, doc, target))
            .collect();

        stream::iter(calls)
            .buffered(self.settings.max_concurrency.max(1))
            .collect()
            .await
    }

    async fn translate_one(
        &self,
        mut result: SearchResult,
        doc: Option<Document>,
        target: &LangCode,
    ) -> SearchResult {
        let Some(doc) = doc else {
            return result;
        };
        let fields = self
            .policy
            .translate_document(&doc, result.relevance_score, target)
            .await;
        for _ in 0..fields.failures {
            self.metrics.record_provider_failure(ProviderKind::Translation);
        }
        result.translated_title = fields.title;
        result.translated_content = fields.content;
        result
    }
}
