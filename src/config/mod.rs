pub mod app;
pub mod observability;
pub mod resilience;

pub use app::{AppConfig, AppMetadata};
pub use observability::ObservabilityConfig;
pub use resilience::{BreakerConfig, ResilienceConfig};

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    /// A value was read but is not acceptable
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Validation of a configuration section after deserialization
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Construction of a configuration section from its documented defaults
pub trait WithDefaults {
    fn with_defaults() -> Self;
}

/// Load the application configuration from files and environment variables
pub fn load() -> Result<AppConfig, ConfigError> {
    app::load_config()
}
