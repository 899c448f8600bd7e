//! Resilience patterns for fault-tolerant callers
//!
//! # Available Patterns
//!
//! - **Circuit Breaker**: stops invoking an operation after it has failed too many
//!   times in a row, and lets calls through again once a cooldown has passed.
//!
//! # Example
//!
//! ```rust
//! use lighter_breaker::resilience::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CircuitBreakerConfig {
//!     max_failures: 5,
//!     reset_timeout: Duration::from_secs(30),
//! };
//!
//! let cb = CircuitBreaker::with_config("payment-api", config);
//!
//! let result = cb.call_async(async {
//!     // Your risky operation here
//!     Ok::<_, std::io::Error>(())
//! }).await;
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

mod circuit_breaker;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState,
    DEFAULT_MAX_FAILURES, DEFAULT_RESET_TIMEOUT,
};
