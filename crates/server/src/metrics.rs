//! Prometheus-backed metrics for HTTP requests and the search pipeline.

use clir::{PipelineMetrics, ProviderKind};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;

static PROMETHEUS: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

/// Installs the global Prometheus recorder on first call and returns its
/// handle. Later calls reuse it; `None` if another recorder already won.
pub fn install_prometheus() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "metrics recorder unavailable; /metrics disabled");
                None
            }
        })
        .clone()
}

/// Records `http_requests_total` and `http_request_duration_seconds`,
/// labeled by method, matched route and status.
pub fn record_request(method: &str, route: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Pipeline observer that writes through the `metrics` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetrics;

impl PipelineMetrics for PrometheusMetrics {
    fn record_search(&self, latency: Duration, ranked: usize, returned: usize, warnings: usize) {
        counter!("clir_searches_total").increment(1);
        histogram!("clir_search_duration_seconds").record(latency.as_secs_f64());
        histogram!("clir_ranked_documents").record(ranked as f64);
        histogram!("clir_returned_results").record(returned as f64);
        if warnings > 0 {
            counter!("clir_search_warnings_total").increment(warnings as u64);
        }
    }

    fn record_provider_failure(&self, kind: ProviderKind) {
        counter!("clir_provider_failures_total", "provider" => kind.as_str()).increment(1);
    }

    fn record_rejected(&self) {
        counter!("clir_searches_rejected_total").increment(1);
    }
}
