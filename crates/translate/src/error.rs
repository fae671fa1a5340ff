use thiserror::Error;

/// Errors surfaced by translation providers.
#[derive(Debug, Clone, Error)]
pub enum TranslateError {
    #[error("invalid translate config: {0}")]
    InvalidConfig(String),
    #[error("invalid language code '{0}'")]
    InvalidLang(String),
    /// The provider has no table or model for this target.
    #[error("target language '{0}' is not supported by this provider")]
    UnsupportedLanguage(String),
    /// Dictionary lookup miss.
    #[error("no dictionary entry for the given text in '{lang}'")]
    NoEntry { lang: String },
    /// Translation is switched off in configuration.
    #[error("translation is disabled")]
    Disabled,
    #[error("translation request failed: {0}")]
    Request(String),
    #[error("translation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("circuit breaker open for translation provider '{0}'")]
    CircuitOpen(String),
    #[error("invalid translation response: {0}")]
    InvalidResponse(String),
}

impl TranslateError {
    pub fn is_transient(&self) -> bool {
        match self {
            TranslateError::Request(_) => true,
            TranslateError::Status { status, .. } => resilience::is_retryable_status(*status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        TranslateError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(TranslateError::Request("timeout".into()).is_transient());
        assert!(TranslateError::Status {
            status: 502,
            body: String::new()
        }
        .is_transient());
        assert!(!TranslateError::Status {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!TranslateError::Disabled.is_transient());
        assert!(!TranslateError::NoEntry { lang: "hi".into() }.is_transient());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = TranslateError::UnsupportedLanguage("fr".into());
        assert!(err.to_string().contains("'fr'"));
    }
}
