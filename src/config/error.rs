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
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid generator timeout")]
    InvalidTimeout,

    #[error("Generator temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Generator max_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("Generator base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Truncated channel messages must fit within max_length")]
    InvalidTruncation,

    #[error("Sanitizer ceiling is too small")]
    InvalidSanitizerCeiling,

    #[error("Ghost threshold must be a positive number of days")]
    InvalidGhostThreshold,

    #[error("Reply ceiling must be greater than zero")]
    InvalidReplyCeiling,

    #[error("Business hours must satisfy open_hour < close_hour <= 24")]
    InvalidBusinessHours,

    #[error("UTC offset must be between -12 and +14 hours")]
    InvalidUtcOffset,

    #[error("Unknown log level: {0}")]
    InvalidLogLevel(String),
}
