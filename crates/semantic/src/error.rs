use thiserror::Error;

/// Errors surfaced by embedding providers.
#[derive(Debug, Clone, Error)]
pub enum SemanticError {
    /// Configuration is inconsistent (e.g. api mode without `api_url`).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// The request never produced an HTTP response (connect, timeout, TLS).
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The embedding service answered with a non-success status.
    #[error("embedding service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The provider's circuit breaker rejected the call.
    #[error("circuit breaker open for embedding provider '{0}'")]
    CircuitOpen(String),
    /// The response body did not contain usable vectors.
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

impl SemanticError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SemanticError::Request(_) => true,
            SemanticError::Status { status, .. } => resilience::is_retryable_status(*status),
            SemanticError::InvalidConfig(_)
            | SemanticError::CircuitOpen(_)
            | SemanticError::InvalidResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for SemanticError {
    fn from(err: reqwest::Error) -> Self {
        SemanticError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = SemanticError::InvalidConfig("missing api_url".into());
        assert!(err.to_string().contains("invalid semantic config"));
        assert!(err.to_string().contains("missing api_url"));

        let err = SemanticError::Status {
            status: 503,
            body: "overloaded".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn transient_classification() {
        assert!(SemanticError::Request("connection reset".into()).is_transient());
        assert!(SemanticError::Status {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!SemanticError::Status {
            status: 401,
            body: String::new()
        }
        .is_transient());
        assert!(!SemanticError::InvalidResponse("empty".into()).is_transient());
        assert!(!SemanticError::CircuitOpen("hf".into()).is_transient());
    }
}
