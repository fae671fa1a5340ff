//! Translation providers for cross-lingual retrieval.
//!
//! Callers depend on the [`Translator`] trait only. Backends:
//!
//! - **Dictionary** - exact-match phrase tables. Ships with an English to
//!   Hindi table for the sample corpus; more tables load from JSON.
//! - **API** - LibreTranslate, Hugging Face translation pipelines, or a custom
//!   JSON endpoint, wrapped in retry and a circuit breaker.
//! - **Disabled** - always fails with [`TranslateError::Disabled`].
//!
//! Providers report failure as an error. Deciding whether a failure matters is
//! left to the caller.
//!
//! ```no_run
//! use translate::{build_translator, LangCode, TranslateConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let translator = build_translator(&TranslateConfig::default()).unwrap();
//!     let hi = LangCode::parse("hi").unwrap();
//!     let out = translator.translate("Query Translation Methods", &hi).await.unwrap();
//!     println!("{out}");
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

mod api;
mod config;
mod dictionary;
mod error;
mod lang;

pub use api::ApiTranslator;
pub use config::{TranslateApiProvider, TranslateConfig, TranslatorMode, ENV_API_TOKEN, ENV_API_URL};
pub use dictionary::DictionaryTranslator;
pub use error::TranslateError;
pub use lang::LangCode;

/// Translates text into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, target: &LangCode) -> Result<String, TranslateError>;
}

/// Translator for deployments that never translate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranslator;

#[async_trait]
impl Translator for DisabledTranslator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn translate(&self, _text: &str, _target: &LangCode) -> Result<String, TranslateError> {
        Err(TranslateError::Disabled)
    }
}

pub fn build_translator(cfg: &TranslateConfig) -> Result<Arc<dyn Translator>, TranslateError> {
    cfg.validate()?;
    let translator: Arc<dyn Translator> = match cfg.mode {
        TranslatorMode::Dictionary => {
            let dict = DictionaryTranslator::from_config(cfg)?;
            tracing::debug!(hindi_entries = dict.entry_count("hi"), "dictionary translator loaded");
            Arc::new(dict)
        }
        TranslatorMode::Api => Arc::new(ApiTranslator::from_config(cfg)?),
        TranslatorMode::Disabled => Arc::new(DisabledTranslator),
    };
    tracing::info!(mode = ?cfg.mode, provider = translator.name(), "translation provider ready");
    Ok(translator)
}
