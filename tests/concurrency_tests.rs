//! Concurrent searches against one shared pipeline.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clir::semantic::HashingEmbedder;
use clir::{
    Corpus, Embedder, NoAuxiliary, SearchOptions, SearchPipeline, SearchSettings, SemanticError,
};
use common::{RecordingMetrics, TaggingTranslator, docs};

/// Sleeps before delegating so many calls overlap.
struct SlowEmbedder {
    inner: HashingEmbedder,
    in_flight: std::sync::atomic::AtomicUsize,
    peak: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl Embedder for SlowEmbedder {
    fn name(&self) -> &str {
        "slow"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        use std::sync::atomic::Ordering;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.embed(text).await
    }
}

fn assert_send<T: Send>(_: T) {}

#[test]
fn search_future_is_send() {
    let pipeline = SearchPipeline::new(
        Corpus::sample(),
        Arc::new(HashingEmbedder::new(64, true).unwrap()),
        Arc::new(TaggingTranslator),
        Arc::new(NoAuxiliary),
        SearchSettings::default(),
    );
    assert_send(pipeline.search("query", SearchOptions::default()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn per_document_fallback_runs_on_spawned_tasks() {
    let embedder = Arc::new(SlowEmbedder {
        inner: HashingEmbedder::new(64, true).unwrap(),
        in_flight: Default::default(),
        peak: Default::default(),
    });
    let pipeline = Arc::new(SearchPipeline::new(
        Corpus::sample(),
        embedder,
        Arc::new(TaggingTranslator),
        Arc::new(NoAuxiliary),
        SearchSettings::default(),
    ));
    let handle = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.search("translation", SearchOptions::default()).await }
    });
    let outcome = handle.await.unwrap().unwrap();
    assert!(!outcome.results.is_empty());
    assert!(
        outcome
            .results
            .iter()
            .all(|r| r.translated_title.is_some())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_searches_agree() {
    let metrics = Arc::new(RecordingMetrics::default());
    let pipeline = Arc::new(
        SearchPipeline::new(
            Corpus::sample(),
            Arc::new(HashingEmbedder::new(384, true).unwrap()),
            Arc::new(TaggingTranslator),
            Arc::new(NoAuxiliary),
            SearchSettings::default(),
        )
        .with_metrics(metrics.clone()),
    );

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                pipeline
                    .search("cross-language retrieval", SearchOptions::default())
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for h in handles {
        outcomes.push(h.await.unwrap());
    }

    let first = &outcomes[0].results;
    for (i, out) in outcomes.iter().enumerate().skip(1) {
        assert_eq!(first, &out.results, "search {i} diverged");
    }
    assert_eq!(metrics.searches.lock().unwrap().len(), 16);
}

#[tokio::test]
async fn document_embeddings_respect_concurrency_bound() {
    let embedder = Arc::new(SlowEmbedder {
        inner: HashingEmbedder::new(64, true).unwrap(),
        in_flight: Default::default(),
        peak: Default::default(),
    });
    let pipeline = SearchPipeline::new(
        Corpus::from_documents(docs(20)).unwrap(),
        embedder.clone(),
        Arc::new(TaggingTranslator),
        Arc::new(NoAuxiliary),
        SearchSettings {
            max_concurrency: 3,
            ..Default::default()
        },
    );

    let out = pipeline.search("title", SearchOptions::default()).await.unwrap();
    assert_eq!(out.results.len(), 5);

    let peak = embedder.peak.load(std::sync::atomic::Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {peak} exceeded bound");
    assert!(peak >= 2, "document embeddings should overlap");
}

#[tokio::test]
async fn dropped_search_leaves_pipeline_usable() {
    let embedder = Arc::new(SlowEmbedder {
        inner: HashingEmbedder::new(64, true).unwrap(),
        in_flight: Default::default(),
        peak: Default::default(),
    });
    let pipeline = SearchPipeline::new(
        Corpus::from_documents(docs(10)).unwrap(),
        embedder,
        Arc::new(TaggingTranslator),
        Arc::new(NoAuxiliary),
        SearchSettings::default(),
    );

    let cancelled = tokio::time::timeout(
        Duration::from_millis(1),
        pipeline.search("title", SearchOptions::default()),
    )
    .await;
    assert!(cancelled.is_err());

    let out = pipeline.search("title", SearchOptions::default()).await.unwrap();
    assert_eq!(out.results.len(), 5);
}
