//! Fake providers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clir::{
    Document, Embedder, LangCode, PipelineMetrics, ProviderKind, SemanticError, TranslateError,
    Translator,
};

type EmbedFn = dyn Fn(&str) -> Result<Vec<f32>, SemanticError> + Send + Sync;

/// Embedder driven by a closure, counting every call.
pub struct FnEmbedder {
    f: Box<EmbedFn>,
    pub calls: AtomicUsize,
}

impl FnEmbedder {
    pub fn new(f: impl Fn(&str) -> Result<Vec<f32>, SemanticError> + Send + Sync + 'static) -> Self {
        Self {
            f: Box::new(f),
            calls: AtomicUsize::new(0),
        }
    }

    /// Same vector for every text, so every score is equal.
    pub fn constant(v: Vec<f32>) -> Self {
        Self::new(move |_| Ok(v.clone()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FnEmbedder {
    fn name(&self) -> &str {
        "fn-embedder"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.f)(text)
    }
}

/// Translator whose every call fails.
pub struct BrokenTranslator {
    pub calls: AtomicUsize,
}

impl BrokenTranslator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Translator for BrokenTranslator {
    fn name(&self) -> &str {
        "broken"
    }

    async fn translate(&self, _text: &str, _target: &LangCode) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TranslateError::Status {
            status: 503,
            body: "model loading".into(),
        })
    }
}

/// Prefixes the text with the target language.
pub struct TaggingTranslator;

#[async_trait]
impl Translator for TaggingTranslator {
    fn name(&self) -> &str {
        "tagging"
    }

    async fn translate(&self, text: &str, target: &LangCode) -> Result<String, TranslateError> {
        Ok(format!("[{target}] {text}"))
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    pub searches: Mutex<Vec<(usize, usize, usize)>>,
    pub failures: Mutex<Vec<ProviderKind>>,
    pub rejected: AtomicUsize,
}

impl PipelineMetrics for RecordingMetrics {
    fn record_search(&self, _latency: Duration, ranked: usize, returned: usize, warnings: usize) {
        self.searches
            .lock()
            .unwrap()
            .push((ranked, returned, warnings));
    }

    fn record_provider_failure(&self, kind: ProviderKind) {
        self.failures.lock().unwrap().push(kind);
    }

    fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn docs(n: usize) -> Vec<Document> {
    (1..=n)
        .map(|i| Document::new(i.to_string(), format!("Title {i}"), format!("Content {i}")))
        .collect()
}
