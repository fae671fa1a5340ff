//! Decides which ranked documents get translated, and absorbs provider
//! failures.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use translate::{LangCode, TranslateError, Translator};
use tracing::{debug, warn};

use crate::types::Document;

/// Score gate for translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdRepr", into = "ThresholdRepr")]
pub enum TranslateThreshold {
    /// Translate every ranked document.
    #[default]
    Always,
    /// Never translate.
    Never,
    /// Translate when the score is strictly greater than the value.
    Above(f32),
}

impl TranslateThreshold {
    pub fn admits(self, score: f32) -> bool {
        match self {
            TranslateThreshold::Always => true,
            TranslateThreshold::Never => false,
            TranslateThreshold::Above(min) => score > min,
        }
    }
}

impl fmt::Display for TranslateThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateThreshold::Always => f.write_str("always"),
            TranslateThreshold::Never => f.write_str("never"),
            TranslateThreshold::Above(v) => write!(f, "> {v}"),
        }
    }
}

/// YAML form: `always`, `never`, or a number (bare or quoted).
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ThresholdRepr {
    Score(f32),
    Keyword(String),
}

impl TryFrom<ThresholdRepr> for TranslateThreshold {
    type Error = String;

    fn try_from(repr: ThresholdRepr) -> Result<Self, Self::Error> {
        let score = match repr {
            ThresholdRepr::Score(v) => v,
            ThresholdRepr::Keyword(word) => match word.trim().to_ascii_lowercase().as_str() {
                "always" => return Ok(TranslateThreshold::Always),
                "never" => return Ok(TranslateThreshold::Never),
                other => other.parse::<f32>().map_err(|_| {
                    format!("translation threshold must be always, never, or a number, got {word:?}")
                })?,
            },
        };
        if !score.is_finite() || !(-1.0..=1.0).contains(&score) {
            return Err(format!("translation threshold {score} is outside [-1, 1]"));
        }
        Ok(TranslateThreshold::Above(score))
    }
}

impl From<TranslateThreshold> for ThresholdRepr {
    fn from(t: TranslateThreshold) -> Self {
        match t {
            TranslateThreshold::Always => ThresholdRepr::Keyword("always".into()),
            TranslateThreshold::Never => ThresholdRepr::Keyword("never".into()),
            TranslateThreshold::Above(v) => ThresholdRepr::Score(v),
        }
    }
}

/// Translated fields for one document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TranslatedFields {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Provider calls that failed (0 to 2).
    pub failures: usize,
}

/// Gate plus provider. Never mutates documents and never fails.
pub struct TranslationPolicy {
    translator: Arc<dyn Translator>,
    threshold: TranslateThreshold,
}

impl TranslationPolicy {
    pub fn new(translator: Arc<dyn Translator>, threshold: TranslateThreshold) -> Self {
        Self {
            translator,
            threshold,
        }
    }

    pub fn threshold(&self) -> TranslateThreshold {
        self.threshold
    }

    pub fn translator_name(&self) -> &str {
        self.translator.name()
    }

    pub fn should_translate(&self, score: f32) -> bool {
        self.threshold.admits(score)
    }

    /// Translate `text`, or `None` on provider failure or empty output.
    pub async fn maybe_translate(&self, text: &str, target: &LangCode) -> Option<String> {
        self.attempt(text, target).await.into_text()
    }

    /// Translate title and content concurrently when `score` passes the gate.
    pub async fn translate_document(
        &self,
        doc: &Document,
        score: f32,
        target: &LangCode,
    ) -> TranslatedFields {
        if !self.should_translate(score) {
            return TranslatedFields::default();
        }

        let (title, content) = tokio::join!(
            self.attempt(&doc.title, target),
            self.attempt(&doc.content, target)
        );
        let failures = usize::from(title.failed()) + usize::from(content.failed());
        if failures > 0 {
            debug!(document_id = %doc.id, failures, "document returned without some translations");
        }
        TranslatedFields {
            title: title.into_text(),
            content: content.into_text(),
            failures,
        }
    }

    async fn attempt(&self, text: &str, target: &LangCode) -> Attempt {
        match self.translator.translate(text, target).await {
            Ok(out) if out.trim().is_empty() => Attempt::Empty,
            Ok(out) => Attempt::Translated(out),
            Err(TranslateError::Disabled) => Attempt::Empty,
            Err(err @ TranslateError::NoEntry { .. }) => {
                debug!(provider = self.translator.name(), target = %target, error = %err, "no translation available");
                Attempt::Failed
            }
            Err(err) => {
                warn!(provider = self.translator.name(), target = %target, error = %err, "translation failed");
                Attempt::Failed
            }
        }
    }
}

/// Outcome of one provider call.
#[derive(Debug, PartialEq, Eq)]
enum Attempt {
    Translated(String),
    /// Blank output or a disabled provider. Not counted as a failure.
    Empty,
    Failed,
}

impl Attempt {
    fn failed(&self) -> bool {
        matches!(self, Attempt::Failed)
    }

    fn into_text(self) -> Option<String> {
        match self {
            Attempt::Translated(text) => Some(text),
            Attempt::Empty | Attempt::Failed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Upper {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Translator for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        async fn translate(&self, text: &str, _target: &LangCode) -> Result<String, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match text {
                "fail" => Err(TranslateError::Request("down".into())),
                "blank" => Ok("   ".into()),
                _ => Ok(text.to_uppercase()),
            }
        }
    }

    fn policy(threshold: TranslateThreshold) -> (TranslationPolicy, Arc<Upper>) {
        let t = Arc::new(Upper {
            calls: AtomicUsize::new(0),
        });
        (TranslationPolicy::new(t.clone(), threshold), t)
    }

    fn hi() -> LangCode {
        LangCode::parse("hi").unwrap()
    }

    #[test]
    fn threshold_gate() {
        assert!(TranslateThreshold::Always.admits(-1.0));
        assert!(!TranslateThreshold::Never.admits(1.0));
        assert!(TranslateThreshold::Above(0.5).admits(0.51));
        assert!(!TranslateThreshold::Above(0.5).admits(0.5));
    }

    #[test]
    fn threshold_yaml_forms() {
        let parse = |s: &str| serde_yaml::from_str::<TranslateThreshold>(s);
        assert_eq!(parse("always").unwrap(), TranslateThreshold::Always);
        assert_eq!(parse("Never").unwrap(), TranslateThreshold::Never);
        assert_eq!(parse("0.5").unwrap(), TranslateThreshold::Above(0.5));
        assert_eq!(parse("'0.25'").unwrap(), TranslateThreshold::Above(0.25));
        assert!(parse("sometimes").is_err());
        assert!(parse("2.0").is_err());
    }

    #[test]
    fn threshold_serializes_back() {
        assert_eq!(
            serde_json::to_string(&TranslateThreshold::Always).unwrap(),
            r#""always""#
        );
        assert_eq!(
            serde_json::to_string(&TranslateThreshold::Above(0.5)).unwrap(),
            "0.5"
        );
    }

    #[tokio::test]
    async fn failures_become_none() {
        let (p, _) = policy(TranslateThreshold::Always);
        assert_eq!(p.maybe_translate("fail", &hi()).await, None);
        assert_eq!(p.maybe_translate("blank", &hi()).await, None);
        assert_eq!(p.maybe_translate("ok", &hi()).await.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn gate_skips_provider_entirely() {
        let (p, t) = policy(TranslateThreshold::Above(0.5));
        let doc = Document::new("1", "title", "content");
        let fields = p.translate_document(&doc, 0.2, &hi()).await;
        assert_eq!(fields, TranslatedFields::default());
        assert_eq!(t.calls.load(Ordering::SeqCst), 0);

        let fields = p.translate_document(&doc, 0.9, &hi()).await;
        assert_eq!(fields.title.as_deref(), Some("TITLE"));
        assert_eq!(fields.content.as_deref(), Some("CONTENT"));
        assert_eq!(t.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn partial_failure_keeps_the_other_field() {
        let (p, _) = policy(TranslateThreshold::Always);
        let doc = Document::new("1", "fail", "body");
        let fields = p.translate_document(&doc, 0.0, &hi()).await;
        assert_eq!(fields.title, None);
        assert_eq!(fields.content.as_deref(), Some("BODY"));
        assert_eq!(fields.failures, 1);
        assert_eq!(doc.title, "fail");
    }

    struct Disabled;

    #[async_trait]
    impl Translator for Disabled {
        fn name(&self) -> &str {
            "disabled"
        }

        async fn translate(&self, _text: &str, _target: &LangCode) -> Result<String, TranslateError> {
            Err(TranslateError::Disabled)
        }
    }

    #[tokio::test]
    async fn attempt_outcomes_are_distinct() {
        let (p, _) = policy(TranslateThreshold::Always);
        assert_eq!(
            p.attempt("ok", &hi()).await,
            Attempt::Translated("OK".into())
        );
        assert_eq!(p.attempt("blank", &hi()).await, Attempt::Empty);
        assert_eq!(p.attempt("fail", &hi()).await, Attempt::Failed);
    }

    #[tokio::test]
    async fn empty_output_is_not_a_failure() {
        let (p, _) = policy(TranslateThreshold::Always);
        let doc = Document::new("1", "blank", "fail");
        let fields = p.translate_document(&doc, 0.0, &hi()).await;
        assert_eq!(fields.title, None);
        assert_eq!(fields.content, None);
        assert_eq!(fields.failures, 1);

        let off = TranslationPolicy::new(Arc::new(Disabled), TranslateThreshold::Always);
        let fields = off.translate_document(&doc, 0.0, &hi()).await;
        assert_eq!(fields, TranslatedFields::default());
    }
}
