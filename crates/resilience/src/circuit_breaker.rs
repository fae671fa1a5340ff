//! Circuit breaker for remote providers.
//!
//! After `failure_threshold` consecutive failures the breaker opens and
//! rejects calls outright. Once `reset_timeout` has elapsed a single probe is
//! let through (half-open); its outcome closes or re-opens the circuit.
//!
//! A half-open call that never reports back (its future was dropped mid-flight) does
//! not wedge the breaker: [`CallPermit`] re-opens the circuit on drop, and a
//! half-open lease older than `reset_timeout` is handed to the next caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// Time to wait in the open state before allowing a probe.
    #[serde(with = "crate::serde_millis", rename = "reset_timeout_ms")]
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }
}

/// Current state of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Requests are allowed.
    Closed,
    /// Requests are rejected.
    Open,
    /// A probe request is allowed.
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    last_state_change: Instant,
}

/// Circuit breaker owned by a single provider client.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
    failure_count: AtomicU64,
    success_count: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                last_state_change: Instant::now(),
            }),
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if a request should be allowed through.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if inner.last_state_change.elapsed() >= self.config.reset_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.last_state_change = Instant::now();
                    tracing::info!("circuit half-open, sending probe");
                    true
                } else {
                    false
                }
            }
            // One half-open call at a time, until its lease runs out.
            CircuitState::HalfOpen => {
                if inner.last_state_change.elapsed() >= self.config.reset_timeout {
                    inner.last_state_change = Instant::now();
                    tracing::warn!("half-open call never reported back, admitting another");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Like [`allow_request`](Self::allow_request), but returns a permit that
    /// must be settled with the call's outcome. Dropping it unsettled counts
    /// as an abandoned call.
    pub fn try_acquire(&self) -> Option<CallPermit<'_>> {
        self.allow_request().then_some(CallPermit {
            breaker: self,
            settled: false,
        })
    }

    fn record_abandoned(&self) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Open;
            inner.last_state_change = Instant::now();
            tracing::warn!("half-open call abandoned, circuit re-opened");
        }
    }

    pub fn record_success(&self) {
        self.success_count.fetch_add(1, Ordering::Relaxed);

        let mut inner = self.lock();
        inner.consecutive_failures = 0;
        if inner.state != CircuitState::Closed {
            inner.state = CircuitState::Closed;
            inner.last_state_change = Instant::now();
            tracing::info!("circuit closed");
        }
    }

    pub fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);

        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        let trip = match inner.state {
            CircuitState::Closed => inner.consecutive_failures >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };
        if trip {
            inner.state = CircuitState::Open;
            inner.last_state_change = Instant::now();
            tracing::warn!(
                failures = inner.consecutive_failures,
                "circuit opened after repeated provider failures"
            );
        }
    }

    pub fn current_state(&self) -> CircuitState {
        self.lock().state
    }

    /// Total failures recorded over the breaker's lifetime.
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Total successes recorded over the breaker's lifetime.
    pub fn success_count(&self) -> u64 {
        self.success_count.load(Ordering::Relaxed)
    }
}

/// Admission for one call through a [`CircuitBreaker`].
#[must_use = "settle the permit with success() or failure()"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl CallPermit<'_> {
    pub fn success(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.record_abandoned();
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_breaker_starts_closed() {
        let cb = CircuitBreaker::default();
        assert_eq!(cb.current_state(), CircuitState::Closed);
        assert!(cb.allow_request());
    }

    #[test]
    fn circuit_breaker_opens_after_failures() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::default().with_failure_threshold(3));

        for _ in 0..3 {
            cb.record_failure();
        }

        assert_eq!(cb.current_state(), CircuitState::Open);
        assert!(!cb.allow_request());
        assert_eq!(cb.failure_count(), 3);
    }

    #[test]
    fn circuit_breaker_resets_on_success() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::default().with_failure_threshold(3));

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.current_state(), CircuitState::Closed);

        cb.record_success();

        // Counter restarted, three more failures needed
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.current_state(), CircuitState::Closed);
        cb.record_failure();
        assert_eq!(cb.current_state(), CircuitState::Open);
    }

    #[test]
    fn half_open_probe_closes_on_success() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::default()
                .with_failure_threshold(1)
                .with_reset_timeout(Duration::from_millis(200)),
        );

        cb.record_failure();
        assert_eq!(cb.current_state(), CircuitState::Open);
        std::thread::sleep(Duration::from_millis(250));

        assert!(cb.allow_request());
        assert_eq!(cb.current_state(), CircuitState::HalfOpen);
        // Second caller is held back while the probe is in flight
        assert!(!cb.allow_request());

        cb.record_success();
        assert_eq!(cb.current_state(), CircuitState::Closed);
        assert!(cb.allow_request());
    }

    #[test]
    fn half_open_probe_reopens_on_failure() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::default()
                .with_failure_threshold(1)
                .with_reset_timeout(Duration::ZERO),
        );

        cb.record_failure();
        assert!(cb.allow_request());
        cb.record_failure();
        assert_eq!(cb.current_state(), CircuitState::Open);
    }

    #[test]
    fn open_circuit_waits_for_timeout() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::default()
                .with_failure_threshold(1)
                .with_reset_timeout(Duration::from_secs(3600)),
        );

        cb.record_failure();
        assert!(!cb.allow_request());
        assert_eq!(cb.current_state(), CircuitState::Open);
    }

    #[test]
    fn silent_half_open_lease_expires() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::default()
                .with_failure_threshold(1)
                .with_reset_timeout(Duration::from_millis(30)),
        );

        cb.record_failure();
        std::thread::sleep(Duration::from_millis(40));
        assert!(cb.allow_request());
        assert!(!cb.allow_request());

        // The admitted call never records an outcome.
        std::thread::sleep(Duration::from_millis(40));
        assert!(cb.allow_request());
        cb.record_success();
        assert_eq!(cb.current_state(), CircuitState::Closed);
    }

    #[test]
    fn dropped_permit_reopens_half_open_circuit() {
        let cb = CircuitBreaker::new(
            CircuitBreakerConfig::default()
                .with_failure_threshold(1)
                .with_reset_timeout(Duration::ZERO),
        );

        cb.record_failure();
        let permit = cb.try_acquire().expect("half-open call admitted");
        assert_eq!(cb.current_state(), CircuitState::HalfOpen);
        drop(permit);
        assert_eq!(cb.current_state(), CircuitState::Open);

        cb.try_acquire().expect("next call admitted").success();
        assert_eq!(cb.current_state(), CircuitState::Closed);
    }

    #[test]
    fn dropped_permit_in_closed_state_is_ignored() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::default().with_failure_threshold(1));
        drop(cb.try_acquire());
        assert_eq!(cb.current_state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
    }

    #[test]
    fn settled_permits_record_outcomes() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::default().with_failure_threshold(1));
        cb.try_acquire().unwrap().failure();
        assert_eq!(cb.current_state(), CircuitState::Open);
        assert_eq!(cb.failure_count(), 1);
        assert!(cb.try_acquire().is_none());
    }
}
