use std::time::Duration;

use async_trait::async_trait;
use resilience::{execute_with_retry_async, CircuitBreaker, RetryConfig};
use serde_json::{json, Value};

use crate::config::TranslateApiProvider;
use crate::{LangCode, TranslateConfig, TranslateError, Translator};

/// Machine translation through a remote HTTP endpoint.
pub struct ApiTranslator {
    http: reqwest::Client,
    url: String,
    auth_header: Option<String>,
    provider: TranslateApiProvider,
    source_lang: LangCode,
    retry: RetryConfig,
    breaker: Option<CircuitBreaker>,
}

impl ApiTranslator {
    pub fn from_config(cfg: &TranslateConfig) -> Result<Self, TranslateError> {
        cfg.validate()?;
        let url = cfg
            .api_url
            .clone()
            .ok_or_else(|| TranslateError::InvalidConfig("api_url is required for api mode".into()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.api_timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.api_timeout_secs.min(10)))
            .build()
            .map_err(|e| TranslateError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

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
            source_lang: cfg.source_lang.clone(),
            retry,
            breaker,
        })
    }

    async fn send(&self, payload: Value) -> Result<Value, TranslateError> {
        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header(reqwest::header::AUTHORIZATION, header);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TranslateError::InvalidResponse(format!("invalid JSON: {e}")))
    }
}

#[async_trait]
impl Translator for ApiTranslator {
    fn name(&self) -> &str {
        match self.provider {
            TranslateApiProvider::LibreTranslate => "libretranslate",
            TranslateApiProvider::HuggingFace => "huggingface",
            TranslateApiProvider::Custom => "custom",
        }
    }

    async fn translate(&self, text: &str, target: &LangCode) -> Result<String, TranslateError> {
        let permit = match &self.breaker {
            Some(cb) => match cb.try_acquire() {
                Some(permit) => Some(permit),
                None => return Err(TranslateError::CircuitOpen(self.name().to_string())),
            },
            None => None,
        };

        let payload = build_payload(self.provider, text, &self.source_lang, target);
        let outcome = execute_with_retry_async(&self.retry, TranslateError::is_transient, |attempt| {
            let payload = payload.clone();
            async move {
                if attempt > 0 {
                    tracing::debug!(attempt, provider = self.name(), "retrying translation request");
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

        parse_translation(outcome.into_result()?)
    }
}

fn build_payload(
    provider: TranslateApiProvider,
    text: &str,
    source: &LangCode,
    target: &LangCode,
) -> Value {
    match provider {
        TranslateApiProvider::LibreTranslate => json!({
            "q": text,
            "source": source.to_string(),
            "target": target.to_string(),
            "format": "text",
        }),
        TranslateApiProvider::HuggingFace => json!({
            "inputs": text,
            "parameters": {
                "src_lang": source.to_string(),
                "tgt_lang": target.to_string(),
            },
        }),
        TranslateApiProvider::Custom => json!({
            "text": text,
            "source_lang": source.to_string(),
            "target_lang": target.to_string(),
        }),
    }
}

/// Accepts `{"translatedText"}`, `{"translation"}`, `{"translated_text"}`,
/// `[{"translation_text"}]` and a bare JSON string.
fn parse_translation(value: Value) -> Result<String, TranslateError> {
    const KEYS: [&str; 4] = ["translatedText", "translation", "translated_text", "translation_text"];

    match value {
        Value::String(s) => Ok(s),
        Value::Object(mut map) => KEYS
            .iter()
            .find_map(|k| match map.remove(*k) {
                Some(Value::String(s)) => Some(s),
                _ => None,
            })
            .ok_or_else(|| TranslateError::InvalidResponse("no translated text in response".into())),
        Value::Array(mut items) if !items.is_empty() => parse_translation(items.swap_remove(0)),
        other => Err(TranslateError::InvalidResponse(format!(
            "unsupported response shape: {other}"
        ))),
    }
}
