use std::time::Duration;

use async_trait::async_trait;
use resilience::{execute_with_retry_async, CircuitBreaker, RetryConfig};
use serde_json::{json, Value};

use crate::config::ApiProvider;
use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, SemanticConfig, SemanticError};

/// Embedding provider backed by a remote inference endpoint.
///
/// The client owns its connection pool and circuit breaker, so two
/// `ApiEmbedder`s pointed at different services never share failure state.
pub struct ApiEmbedder {
    http: reqwest::Client,
    url: String,
    auth_header: Option<String>,
    provider: ApiProvider,
    model_name: String,
    normalize: bool,
    retry: RetryConfig,
    breaker: Option<CircuitBreaker>,
}

impl ApiEmbedder {
    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        let url = cfg
            .api_url
            .clone()
            .ok_or_else(|| SemanticError::InvalidConfig("api_url is required for api mode".into()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.api_timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.api_timeout_secs.min(10)))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| SemanticError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        let (retry, breaker) = if cfg.enable_resilience {
            (cfg.retry, Some(CircuitBreaker::new(cfg.circuit_breaker)))
        } else {
            (RetryConfig::disabled(), None)
        };

        Ok(Self {
            http,
            url,
            auth_header: cfg.api_auth_header.clone(),
            provider: cfg.api_provider,
            model_name: cfg.model_name.clone(),
            normalize: cfg.normalize,
            retry,
            breaker,
        })
    }

    async fn request_vectors(&self, texts: &[String], batch: bool) -> Result<Vec<Vec<f32>>, SemanticError> {
        let permit = match &self.breaker {
            Some(cb) => match cb.try_acquire() {
                Some(permit) => Some(permit),
                None => return Err(SemanticError::CircuitOpen(self.model_name.clone())),
            },
            None => None,
        };

        let payload = build_api_payload(self.provider, texts, &self.model_name, batch);
        let outcome = execute_with_retry_async(&self.retry, SemanticError::is_transient, |attempt| {
            let payload = payload.clone();
            async move {
                if attempt > 0 {
                    tracing::debug!(attempt, model = %self.model_name, "retrying embedding request");
                }
                self.send(payload).await
            }
        })
        .await;

        if let Some(permit) = permit {
            match &outcome.result {
                Ok(_) => permit.success(),
                Err(_) => permit.failure(),
            }
        }

        let mut vectors = parse_embeddings_from_value(outcome.into_result()?)?;
        if self.normalize {
            for v in &mut vectors {
                l2_normalize_in_place(v);
            }
        }
        Ok(vectors)
    }

    async fn send(&self, payload: Value) -> Result<Value, SemanticError> {
        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header(reqwest::header::AUTHORIZATION, header);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SemanticError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SemanticError::InvalidResponse(format!("invalid JSON: {e}")))
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let texts = [text.to_string()];
        self.request_vectors(&texts, false)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SemanticError::InvalidResponse("response did not contain embeddings".into()))
    }

    fn supports_batch(&self) -> bool {
        true
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.request_vectors(texts, true).await?;
        if vectors.len() != texts.len() {
            return Err(SemanticError::InvalidResponse(format!(
                "API returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

fn build_api_payload(provider: ApiProvider, texts: &[String], model: &str, batch: bool) -> Value {
    let first = texts.first().map(String::as_str).unwrap_or_default();
    match (provider, batch) {
        (ApiProvider::HuggingFace, true) => json!({ "inputs": texts }),
        (ApiProvider::HuggingFace, false) => json!({ "inputs": first }),
        (ApiProvider::OpenAi, true) => json!({ "input": texts, "model": model }),
        (ApiProvider::OpenAi, false) => json!({ "input": first, "model": model }),
        (ApiProvider::Custom, true) => json!({ "texts": texts }),
        (ApiProvider::Custom, false) => json!({ "text": first }),
    }
}

/// Accepts `[..]`, `[[..], ..]`, `{"embeddings": ..}` and `{"data": [{"embedding": ..}]}`.
fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }
            if let Some(embedding) = map.remove("embedding") {
                return parse_embedding_vector(embedding).map(|v| vec![v]);
            }
            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => obj
                            .remove("embedding")
                            .ok_or_else(|| {
                                SemanticError::InvalidResponse(
                                    "missing `embedding` field in data item".into(),
                                )
                            })
                            .and_then(parse_embedding_vector),
                        _ => Err(SemanticError::InvalidResponse(
                            "unexpected entry inside `data` array".into(),
                        )),
                    })
                    .collect();
            }
            Err(SemanticError::InvalidResponse(
                "unsupported API response shape".into(),
            ))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(Vec::new()),
        Value::Array(items) if items.iter().all(Value::is_array) => {
            items.into_iter().map(parse_embedding_vector).collect()
        }
        other => parse_embedding_vector(other).map(|v| vec![v]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, SemanticError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SemanticError::InvalidResponse("non-finite embedding value".into())),
                other => Err(SemanticError::InvalidResponse(format!(
                    "embedding entries must be numbers, got {other}"
                ))),
            })
            .collect(),
        other => Err(SemanticError::InvalidResponse(format!(
            "embedding vector must be an array, got {other}"
        ))),
    }
}
