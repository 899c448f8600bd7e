#![deny(warnings)]

pub mod config;
pub mod observability;
pub mod resilience;

// Re-export commonly used types for convenience
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState,
};
