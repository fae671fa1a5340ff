use std::time::Duration;

/// Which collaborator a soft failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Embedding,
    Translation,
    Auxiliary,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Embedding => "embedding",
            ProviderKind::Translation => "translation",
            ProviderKind::Auxiliary => "auxiliary",
        }
    }
}

/// Metrics observer for the search pipeline.
pub trait PipelineMetrics: Send + Sync {
    /// One completed search. `ranked` counts corpus documents that got a score.
    fn record_search(&self, latency: Duration, ranked: usize, returned: usize, warnings: usize);

    fn record_provider_failure(&self, kind: ProviderKind);

    /// A search rejected before any provider call.
    fn record_rejected(&self) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl PipelineMetrics for NoopMetrics {
    fn record_search(&self, _latency: Duration, _ranked: usize, _returned: usize, _warnings: usize) {}

    fn record_provider_failure(&self, _kind: ProviderKind) {}
}
