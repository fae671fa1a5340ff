//! Embedding providers for cross-lingual retrieval.
//!
//! This crate turns text into dense vectors so queries and documents can be
//! compared with cosine similarity. Everything downstream talks to the
//! [`Embedder`] trait, so the ranking code never knows which backend it got.
//!
//! Two modes ship today:
//!
//! - **Hashing mode** - Local feature hashing over words and word pairs. No
//!   model files, no network, same input always gives the same vector.
//! - **API mode** - Call out to a hosted model (Hugging Face router, an
//!   OpenAI-style endpoint, or your own service).
//!
//! API calls go through retry with backoff plus a per-provider circuit breaker
//! from the `resilience` crate. Failures surface as [`SemanticError`]; there is
//! no silent fallback to fake vectors.
//!
//! ## Quick example
//!
//! ```no_run
//! use semantic::{build_embedder, SemanticConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let embedder = build_embedder(&SemanticConfig::default()).unwrap();
//!     let v = embedder.embed("cross-language information retrieval").await.unwrap();
//!     assert_eq!(v.len(), 384);
//! }
//! ```
//!
//! ## Env vars to know
//!
//! - `CLIR_SEMANTIC_API_URL` - Override the API endpoint
//! - `CLIR_SEMANTIC_API_TOKEN` - Bearer token for the API
//!
//! Full example at `examples/embed.rs`.

use std::sync::Arc;

use async_trait::async_trait;

mod api;
mod config;
mod error;
mod hashing;
pub mod normalize;

pub use api::ApiEmbedder;
pub use config::{ApiProvider, EmbedderMode, SemanticConfig, ENV_API_TOKEN, ENV_API_URL};
pub use error::SemanticError;
pub use hashing::HashingEmbedder;

/// Maps text to a dense vector.
///
/// Implementations must be safe to call concurrently. Vectors for a single
/// provider should share one dimension; callers skip mismatched vectors
/// rather than fail.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError>;

    /// Whether [`embed_batch`](Self::embed_batch) is cheaper than looping.
    fn supports_batch(&self) -> bool {
        false
    }

    /// Embed many texts in one go. Output order matches input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Build the provider described by `cfg`.
pub fn build_embedder(cfg: &SemanticConfig) -> Result<Arc<dyn Embedder>, SemanticError> {
    cfg.validate()?;
    let embedder: Arc<dyn Embedder> = match cfg.mode {
        EmbedderMode::Hashing => Arc::new(HashingEmbedder::from_config(cfg)?),
        EmbedderMode::Api => Arc::new(ApiEmbedder::from_config(cfg)?),
    };
    tracing::info!(mode = ?cfg.mode, provider = embedder.name(), "embedding provider ready");
    Ok(embedder)
}
