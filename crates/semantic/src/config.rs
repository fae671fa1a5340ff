use serde::{Deserialize, Serialize};

use resilience::{CircuitBreakerConfig, RetryConfig};

use crate::SemanticError;

/// Environment variable overriding [`SemanticConfig::api_url`].
pub const ENV_API_URL: &str = "CLIR_SEMANTIC_API_URL";
/// Environment variable holding a bearer token for the embedding API.
pub const ENV_API_TOKEN: &str = "CLIR_SEMANTIC_API_TOKEN";

/// Which embedding backend to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderMode {
    /// Local feature-hashing embedder. No model files, fully deterministic.
    #[default]
    Hashing,
    /// Remote inference endpoint over HTTP.
    Api,
}

/// Wire format spoken by the remote embedding endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    /// `{"inputs": ...}` (Hugging Face feature-extraction pipeline).
    #[serde(alias = "hf")]
    HuggingFace,
    /// `{"input": ..., "model": ...}` returning `{"data": [{"embedding": ...}]}`.
    #[serde(alias = "gpt")]
    OpenAi,
    /// `{"text": ...}` / `{"texts": [...]}`.
    #[default]
    Custom,
}

/// Runtime configuration for the embedding provider.
///
/// # Example
/// ```no_run
/// use semantic::{build_embedder, ApiProvider, EmbedderMode, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     mode: EmbedderMode::Api,
///     api_url: Some("https://router.huggingface.co/hf-inference/models/sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2/pipeline/feature-extraction".into()),
///     api_auth_header: Some("Bearer hf_xxx".into()),
///     api_provider: ApiProvider::HuggingFace,
///     ..Default::default()
/// };
///
/// let embedder = build_embedder(&cfg).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    pub mode: EmbedderMode,
    /// Label reported by the provider (logs, readiness endpoint).
    pub model_name: String,
    /// Vector width of the hashing embedder. Ignored in api mode.
    pub dimension: usize,
    /// Inference endpoint when [`mode`](Self::mode) is `api`.
    pub api_url: Option<String>,
    /// Authorization header (e.g., `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    pub api_provider: ApiProvider,
    /// Per-request timeout in seconds.
    pub api_timeout_secs: u64,
    /// Normalize vectors to unit length.
    pub normalize: bool,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    /// Turn retry and circuit breaking on or off.
    pub enable_resilience: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: EmbedderMode::Hashing,
            model_name: "paraphrase-multilingual-MiniLM-L12-v2".into(),
            dimension: 384,
            api_url: None,
            api_auth_header: None,
            api_provider: ApiProvider::Custom,
            api_timeout_secs: 30,
            normalize: true,
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            enable_resilience: true,
        }
    }
}

impl SemanticConfig {
    /// Fill `api_url` and `api_auth_header` from the environment when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                self.api_url = Some(url);
            }
        }
        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            if !token.trim().is_empty() {
                self.api_auth_header = Some(format!("Bearer {}", token.trim()));
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), SemanticError> {
        match self.mode {
            EmbedderMode::Hashing if self.dimension == 0 => Err(SemanticError::InvalidConfig(
                "dimension must be >= 1".into(),
            )),
            EmbedderMode::Api if self.api_url.as_deref().is_none_or(|u| u.trim().is_empty()) => {
                Err(SemanticError::InvalidConfig(
                    "api_url is required for api mode".into(),
                ))
            }
            EmbedderMode::Api if self.api_timeout_secs == 0 => Err(SemanticError::InvalidConfig(
                "api_timeout_secs must be >= 1".into(),
            )),
            _ => Ok(()),
        }
    }
}
