use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use resilience::{CircuitBreakerConfig, RetryConfig};

use crate::{LangCode, TranslateError};

pub const ENV_API_URL: &str = "CLIR_TRANSLATE_API_URL";
pub const ENV_API_TOKEN: &str = "CLIR_TRANSLATE_API_TOKEN";

/// Which translation backend to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorMode {
    /// Exact-match lookup in phrase tables.
    #[default]
    Dictionary,
    /// Remote machine translation over HTTP.
    Api,
    /// Every call fails with [`TranslateError::Disabled`].
    Disabled,
}

/// Wire format spoken by the remote translation endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslateApiProvider {
    /// `{"q", "source", "target", "format"}` returning `{"translatedText"}`.
    #[default]
    #[serde(alias = "libre")]
    LibreTranslate,
    /// `{"inputs", "parameters": {"src_lang", "tgt_lang"}}` returning
    /// `[{"translation_text"}]`.
    #[serde(alias = "hf")]
    HuggingFace,
    /// `{"text", "source_lang", "target_lang"}` returning `{"translation"}`.
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslateConfig {
    pub mode: TranslatorMode,
    /// Language the corpus is written in.
    pub source_lang: LangCode,
    /// Extra phrase tables (JSON `{"<lang>": {"<source>": "<target>"}}`)
    /// merged over the built-in ones.
    pub dictionary_path: Option<PathBuf>,
    /// Skip the built-in English to Hindi table.
    pub disable_builtin_dictionary: bool,
    pub api_url: Option<String>,
    pub api_auth_header: Option<String>,
    pub api_provider: TranslateApiProvider,
    pub api_timeout_secs: u64,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub enable_resilience: bool,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            mode: TranslatorMode::Dictionary,
            source_lang: LangCode::parse("en").unwrap_or_default(),
            dictionary_path: None,
            disable_builtin_dictionary: false,
            api_url: None,
            api_auth_header: None,
            api_provider: TranslateApiProvider::LibreTranslate,
            api_timeout_secs: 30,
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            enable_resilience: true,
        }
    }
}

impl TranslateConfig {
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

    pub fn validate(&self) -> Result<(), TranslateError> {
        match self.mode {
            TranslatorMode::Api if self.api_url.as_deref().is_none_or(|u| u.trim().is_empty()) => {
                Err(TranslateError::InvalidConfig(
                    "api_url is required for api mode".into(),
                ))
            }
            TranslatorMode::Api if self.api_timeout_secs == 0 => Err(
                TranslateError::InvalidConfig("api_timeout_secs must be >= 1".into()),
            ),
            TranslatorMode::Dictionary
                if self.disable_builtin_dictionary && self.dictionary_path.is_none() =>
            {
                Err(TranslateError::InvalidConfig(
                    "dictionary mode needs the built-in table or a dictionary_path".into(),
                ))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = TranslateConfig::default();
        assert_eq!(cfg.mode, TranslatorMode::Dictionary);
        assert_eq!(cfg.source_lang.to_string(), "en");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn api_mode_requires_url() {
        let cfg = TranslateConfig {
            mode: TranslatorMode::Api,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_dictionary_mode_is_rejected() {
        let cfg = TranslateConfig {
            disable_builtin_dictionary: true,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn deserializes_with_aliases() {
        let cfg: TranslateConfig = serde_json::from_str(
            r#"{"mode": "api", "api_url": "http://localhost:5000/translate", "api_provider": "libre", "source_lang": "EN"}"#,
        )
        .unwrap();
        assert_eq!(cfg.api_provider, TranslateApiProvider::LibreTranslate);
        assert_eq!(cfg.source_lang.to_string(), "en");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn disabled_mode_parses() {
        let cfg: TranslateConfig = serde_json::from_str(r#"{"mode": "disabled"}"#).unwrap();
        assert_eq!(cfg.mode, TranslatorMode::Disabled);
    }
}
