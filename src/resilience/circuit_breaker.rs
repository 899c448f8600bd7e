//! Circuit Breaker Pattern Implementation
//!
//! A circuit breaker wraps a fallible, possibly slow operation and stops invoking it
//! once it has failed too many times in a row, giving the dependency time to recover
//! and giving callers a fast failure instead of repeated timeouts.
//!
//! # State Machine
//!
//! ```text
//! ┌─────────┐   max_failures consecutive failures   ┌─────────┐
//! │ Closed  │ ─────────────────────────────────────► │  Open   │
//! │ (Normal)│                                        │(Failing)│
//! └─────────┘ ◄───────────────────────────────────── └─────────┘
//!              next admission check after reset_timeout
//!              (failure count cleared)
//! ```
//!
//! There is no half-open probing state: the first call admitted after the cooldown
//! is treated as a normal attempt.
//!
//! # Example
//!
//! ```rust
//! use lighter_breaker::resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
//! use std::time::Duration;
//!
//! let config = CircuitBreakerConfig::default()
//!     .with_max_failures(2)
//!     .with_reset_timeout(Duration::from_secs(2));
//! let cb = CircuitBreaker::with_config("payment-service", config);
//!
//! match cb.call(|| Ok::<_, std::io::Error>("Success")) {
//!     Ok(response) => println!("Success: {response}"),
//!     Err(CircuitBreakerError::Open { name }) => println!("{name} is open, skipping"),
//!     Err(CircuitBreakerError::Inner(e)) => println!("Failed: {e}"),
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Consecutive failures needed to trip a breaker built with defaults.
pub const DEFAULT_MAX_FAILURES: u32 = 3;

/// How long a tripped breaker refuses calls before allowing a retry.
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(5);

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, allowing all requests through
    Closed,
    /// Tripped, rejecting all requests until the reset timeout elapses
    Open,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "Closed"),
            CircuitState::Open => write!(f, "Open"),
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    pub max_failures: u32,
    /// Minimum time the circuit stays open before the next call is let through
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: DEFAULT_MAX_FAILURES,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

impl CircuitBreakerConfig {
    /// Sets the consecutive-failure threshold.
    pub fn with_max_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures;
        self
    }

    /// Sets the reset timeout.
    pub fn with_reset_timeout(mut self, reset_timeout: Duration) -> Self {
        self.reset_timeout = reset_timeout;
        self
    }
}

/// Circuit breaker error
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open, the operation was not invoked
    #[error("Circuit breaker is open for {name}")]
    Open { name: String },
    /// The underlying operation failed
    #[error("{0}")]
    Inner(#[source] E),
}

impl<E> CircuitBreakerError<E> {
    /// Returns `true` if the breaker refused the call.
    pub fn is_open(&self) -> bool {
        matches!(self, CircuitBreakerError::Open { .. })
    }

    /// Returns the operation's own error, if there was one.
    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitBreakerError::Open { .. } => None,
            CircuitBreakerError::Inner(err) => Some(err),
        }
    }
}

/// Counters kept alongside the breaker state.
///
/// These are read-only observability for callers; the breaker never exports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircuitBreakerStats {
    /// Calls that actually invoked the operation
    pub total_calls: u64,
    /// Invoked calls whose operation returned an error
    pub total_failures: u64,
    /// Calls refused because the circuit was open
    pub rejected_calls: u64,
    /// Number of Closed -> Open transitions
    pub times_opened: u64,
}

impl CircuitBreakerStats {
    /// Get failure rate (0.0 to 1.0) over invoked calls
    pub fn failure_rate(&self) -> f64 {
        if self.total_calls == 0 {
            return 0.0;
        }
        self.total_failures as f64 / self.total_calls as f64
    }
}

#[derive(Debug, Clone, Copy)]
enum Circuit {
    Closed,
    Open { since: Instant },
}

/// Everything behind the breaker's single lock.
#[derive(Debug)]
struct Inner {
    failures: u32,
    max_failures: u32,
    reset_timeout: Duration,
    circuit: Circuit,
    stats: CircuitBreakerStats,
}

impl Inner {
    fn state(&self) -> CircuitState {
        match self.circuit {
            Circuit::Closed => CircuitState::Closed,
            Circuit::Open { .. } => CircuitState::Open,
        }
    }

    /// Admission check. Performs the Open -> Closed recovery when the reset timeout
    /// has elapsed.
    fn try_admit(&mut self, name: &str) -> bool {
        let since = match self.circuit {
            Circuit::Closed => return true,
            Circuit::Open { since } => since,
        };

        let elapsed = since.elapsed();
        if elapsed < self.reset_timeout {
            return false;
        }

        self.circuit = Circuit::Closed;
        self.failures = 0;
        tracing::info!(
            circuit_breaker = %name,
            state = "Open -> Closed",
            elapsed_ms = elapsed.as_millis() as u64,
            "Circuit breaker closed after reset timeout"
        );
        true
    }

    /// Failures that land while already open belong to calls admitted before the
    /// trip; they are not counted and do not extend the open period.
    fn record_failure(&mut self, name: &str) {
        self.stats.total_calls += 1;
        self.stats.total_failures += 1;

        if let Circuit::Open { .. } = self.circuit {
            return;
        }

        self.failures += 1;
        if self.failures >= self.max_failures {
            self.circuit = Circuit::Open {
                since: Instant::now(),
            };
            self.stats.times_opened += 1;
            tracing::warn!(
                circuit_breaker = %name,
                state = "Closed -> Open",
                consecutive_failures = self.failures,
                failure_threshold = self.max_failures,
                "Circuit breaker opened due to consecutive failures"
            );
        }
    }
}

/// Consecutive-failure circuit breaker
///
/// # Thread Safety
///
/// All state lives behind one mutex and every operation is a single short critical
/// section. The wrapped operation always runs with the lock released, so a slow
/// call never blocks other callers' admission checks or failure reads. Clones share
/// the same state and can be handed to other threads or tasks.
#[derive(Clone)]
pub struct CircuitBreaker {
    /// Name for logging and debugging
    name: String,
    inner: Arc<Mutex<Inner>>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default configuration
    ///
    /// # Example
    ///
    /// ```rust
    /// use lighter_breaker::resilience::CircuitBreaker;
    ///
    /// let cb = CircuitBreaker::new("database");
    /// assert_eq!(cb.max_failures(), 3);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Create a new circuit breaker with custom configuration
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            inner: Arc::new(Mutex::new(Inner {
                failures: 0,
                max_failures: config.max_failures,
                reset_timeout: config.reset_timeout,
                circuit: Circuit::Closed,
                stats: CircuitBreakerStats::default(),
            })),
        }
    }

    // Critical sections are plain field updates and cannot leave the state
    // half-written, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the circuit breaker name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the configured failure threshold
    pub fn max_failures(&self) -> u32 {
        self.lock().max_failures
    }

    /// Get the current reset timeout
    pub fn reset_timeout(&self) -> Duration {
        self.lock().reset_timeout
    }

    /// Get the current state without triggering recovery
    ///
    /// An open breaker whose reset timeout has already elapsed still reports
    /// [`CircuitState::Open`] until the next admission check.
    pub fn state(&self) -> CircuitState {
        self.lock().state()
    }

    /// Get the current consecutive failure count
    pub fn failures(&self) -> u32 {
        self.lock().failures
    }

    /// Get a snapshot of the call counters
    pub fn stats(&self) -> CircuitBreakerStats {
        self.lock().stats
    }

    /// Check whether a call would currently be let through
    ///
    /// If the circuit is open and the reset timeout has elapsed, this closes the
    /// circuit and clears the failure count before returning `true`.
    pub fn is_allowed(&self) -> bool {
        self.lock().try_admit(&self.name)
    }

    /// Replace the reset timeout
    ///
    /// Takes effect for the next admission check, including a circuit that is
    /// already open. Any duration is accepted; `Duration::ZERO` lets the next
    /// check recover immediately.
    pub fn set_reset_timeout(&self, reset_timeout: Duration) {
        let mut inner = self.lock();
        inner.reset_timeout = reset_timeout;
        tracing::debug!(
            circuit_breaker = %self.name,
            reset_timeout_ms = reset_timeout.as_millis() as u64,
            "Circuit breaker reset timeout updated"
        );
    }

    /// Execute an operation protected by the circuit breaker
    ///
    /// Returns [`CircuitBreakerError::Open`] without invoking `f` when the circuit
    /// is open. Otherwise `f` runs with no lock held and its error, if any, is
    /// counted and handed back unchanged in [`CircuitBreakerError::Inner`].
    ///
    /// A success does not clear failures recorded earlier; only a trip followed by
    /// recovery does.
    pub fn call<F, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.admit()?;
        let result = f();
        self.record(result)
    }

    /// Async variant of [`CircuitBreaker::call`]
    ///
    /// The lock is never held across the `.await`. There is no timeout on `f`;
    /// wrap the call in `tokio::time::timeout` if one is needed.
    pub async fn call_async<F, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        self.admit()?;
        let result = f.await;
        self.record(result)
    }

    fn admit<E>(&self) -> Result<(), CircuitBreakerError<E>> {
        let mut inner = self.lock();
        if inner.try_admit(&self.name) {
            return Ok(());
        }

        inner.stats.rejected_calls += 1;
        Err(CircuitBreakerError::Open {
            name: self.name.clone(),
        })
    }

    fn record<T, E>(&self, result: Result<T, E>) -> Result<T, CircuitBreakerError<E>> {
        let mut inner = self.lock();
        match result {
            Ok(value) => {
                inner.stats.total_calls += 1;
                Ok(value)
            }
            Err(err) => {
                inner.record_failure(&self.name);
                Err(CircuitBreakerError::Inner(err))
            }
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &inner.state())
            .field("failures", &inner.failures)
            .field("max_failures", &inner.max_failures)
            .field("reset_timeout", &inner.reset_timeout)
            .field("stats", &inner.stats)
            .finish()
    }
}
