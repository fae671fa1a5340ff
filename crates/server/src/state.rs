use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::metrics::{install_prometheus, PrometheusMetrics};
use clir::{AuxiliarySource, Corpus, JsonFileAuxiliary, NoAuxiliary, PipelineConfig, SearchPipeline};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Search pipeline (shared across requests)
    pub pipeline: Arc<SearchPipeline>,

    /// Present when metrics are enabled and the recorder installed
    pub prometheus: Option<PrometheusHandle>,
}

impl ServerState {
    /// Build the pipeline and its providers from configuration.
    ///
    /// Corpus and config problems are fatal here so the server never starts
    /// half-configured.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline_cfg = match &config.pipeline_config {
            Some(path) => PipelineConfig::from_file(path)
                .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?,
            None => PipelineConfig::default(),
        }
        .with_env_overrides();
        pipeline_cfg
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let corpus = match &config.corpus_path {
            Some(path) => Corpus::from_path(path).map_err(|e| ServerError::Config(e.to_string()))?,
            None => Corpus::sample(),
        };

        let auxiliary: Arc<dyn AuxiliarySource> = match &config.auxiliary_path {
            Some(path) => Arc::new(
                JsonFileAuxiliary::new(path).with_match_query(config.auxiliary_match_query),
            ),
            None => Arc::new(NoAuxiliary),
        };

        let prometheus = if config.metrics_enabled {
            install_prometheus()
        } else {
            None
        };

        let mut pipeline = SearchPipeline::from_config(&pipeline_cfg, corpus, auxiliary)
            .map_err(|e| ServerError::Config(e.to_string()))?;
        if prometheus.is_some() {
            pipeline = pipeline.with_metrics(Arc::new(PrometheusMetrics));
        }

        tracing::info!(
            corpus_documents = pipeline.corpus().len(),
            top_k = pipeline.settings().top_k.get(),
            metrics = prometheus.is_some(),
            "search pipeline ready"
        );

        Ok(Self::with_pipeline(config, pipeline, prometheus))
    }

    /// Wrap an already-built pipeline.
    pub fn with_pipeline(
        config: ServerConfig,
        pipeline: SearchPipeline,
        prometheus: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            prometheus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_use_sample_corpus() {
        let state = ServerState::new(ServerConfig {
            metrics_enabled: false,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(state.pipeline.corpus().len(), 5);
        assert!(state.prometheus.is_none());
        assert_eq!(state.pipeline.info().auxiliary, "none");
    }

    #[test]
    fn missing_corpus_file_is_fatal() {
        let err = ServerState::new(ServerConfig {
            corpus_path: Some("/no/such/corpus.json".into()),
            metrics_enabled: false,
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn bad_pipeline_config_is_fatal() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "version: \"9.9\"\n").unwrap();
        let err = ServerState::new(ServerConfig {
            pipeline_config: Some(file.path().to_path_buf()),
            metrics_enabled: false,
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn auxiliary_path_selects_file_source() {
        let state = ServerState::new(ServerConfig {
            auxiliary_path: Some("notebook_results.json".into()),
            metrics_enabled: false,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(state.pipeline.info().auxiliary, "json_file");
    }
}
