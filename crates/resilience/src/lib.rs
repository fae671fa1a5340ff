//! Resilience patterns for the remote provider clients.
//!
//! Both the embedding and the translation HTTP clients talk to services that
//! can be slow, rate limited or down. These helpers let them retry transient
//! failures with backoff and stop hammering a backend that keeps failing.

mod circuit_breaker;
mod retry;
pub mod serde_millis;

pub use circuit_breaker::{CallPermit, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use retry::{execute_with_retry_async, is_retryable_status, RetryConfig, RetryResult};
