use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Validate, WithDefaults};
use crate::resilience::{
    CircuitBreaker, CircuitBreakerConfig, DEFAULT_MAX_FAILURES, DEFAULT_RESET_TIMEOUT,
};

/// Resilience configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Circuit breaker configuration
    #[serde(default = "BreakerConfig::default")]
    pub circuit_breaker: BreakerConfig,
}

/// Circuit breaker configuration as read from files and environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Number of consecutive failures before opening the circuit
    #[serde(default = "default_circuit_breaker_max_failures")]
    pub max_failures: u32,
    /// Milliseconds the circuit stays open before the next call is let through
    #[serde(default = "default_circuit_breaker_reset_timeout_ms")]
    pub reset_timeout_ms: u64,
}

fn default_circuit_breaker_max_failures() -> u32 {
    DEFAULT_MAX_FAILURES
}

fn default_circuit_breaker_reset_timeout_ms() -> u64 {
    DEFAULT_RESET_TIMEOUT.as_millis() as u64
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: default_circuit_breaker_max_failures(),
            reset_timeout_ms: default_circuit_breaker_reset_timeout_ms(),
        }
    }
}

impl BreakerConfig {
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }

    /// Build a named circuit breaker from these settings
    pub fn build(&self, name: impl Into<String>) -> CircuitBreaker {
        CircuitBreaker::with_config(name, self.into())
    }
}

impl From<&BreakerConfig> for CircuitBreakerConfig {
    fn from(config: &BreakerConfig) -> Self {
        CircuitBreakerConfig {
            max_failures: config.max_failures,
            reset_timeout: config.reset_timeout(),
        }
    }
}

impl Validate for ResilienceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.circuit_breaker.validate()?;
        Ok(())
    }
}

// A zero reset timeout is allowed: the breaker then recovers on the next check.
impl Validate for BreakerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_failures == 0 {
            return Err(ConfigError::ValidationError(
                "resilience.circuit_breaker.max_failures must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl WithDefaults for ResilienceConfig {
    fn with_defaults() -> Self {
        Self::default()
    }
}

impl WithDefaults for BreakerConfig {
    fn with_defaults() -> Self {
        Self::default()
    }
}
