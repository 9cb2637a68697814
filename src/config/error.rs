//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool needs max_connections > 0 and min_connections <= max_connections")]
    InvalidPoolSize,

    #[error("Gateway path must start with '/' and differ from '/health'")]
    InvalidGatewayPath,

    #[error("Gateway setting '{0}' must be greater than zero")]
    ZeroGatewaySetting(&'static str),

    #[error("Idle timeout must be longer than the ping interval")]
    IdleTimeoutTooShort,
}
