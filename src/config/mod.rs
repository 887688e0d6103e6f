//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `LEAD_PILOT` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a runnable
//! dry-run configuration.
//!
//! # Example
//!
//! ```no_run
//! use lead_pilot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod catalogue;
mod channel;
mod error;
mod generator;
mod logging;
mod pipeline;

pub use catalogue::CatalogueConfig;
pub use channel::ChannelConfig;
pub use error::{ConfigError, ConfigValidationError};
pub use generator::GeneratorConfig;
pub use logging::LoggingConfig;
pub use pipeline::PipelineConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Text generator configuration (API key, model, timeout)
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Messaging channel limits
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Dialogue pipeline behaviour and persona
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Optional catalogue override file
    #[serde(default)]
    pub catalogue: CatalogueConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LEAD_PILOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LEAD_PILOT__GENERATOR__API_KEY=...` -> `generator.api_key = ...`
    /// - `LEAD_PILOT__PIPELINE__LEAK_POLICY=annotate` -> `pipeline.leak_policy = annotate`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LEAD_PILOT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.generator.validate()?;
        self.channel.validate()?;
        self.pipeline.validate()?;
        self.logging.validate()?;
        self.catalogue.validate()?;
        Ok(())
    }

    /// True when a generator API key is configured
    pub fn has_generator(&self) -> bool {
        self.generator.adapter_config().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pipeline::LeakPolicy;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "LEAD_PILOT__GENERATOR__API_KEY",
        "LEAD_PILOT__GENERATOR__MODEL",
        "LEAD_PILOT__GENERATOR__TIMEOUT_SECS",
        "LEAD_PILOT__PIPELINE__LEAK_POLICY",
        "LEAD_PILOT__PIPELINE__GHOST_THRESHOLD_DAYS",
        "LEAD_PILOT__PIPELINE__AGENT_NAME",
        "LEAD_PILOT__CHANNEL__MAX_LENGTH",
        "LEAD_PILOT__LOGGING__JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.has_generator());
        assert_eq!(config.pipeline.leak_policy, LeakPolicy::ShortCircuit);
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("LEAD_PILOT__GENERATOR__API_KEY", "sk-test");
        env::set_var("LEAD_PILOT__GENERATOR__MODEL", "gpt-4o");
        env::set_var("LEAD_PILOT__GENERATOR__TIMEOUT_SECS", "15");
        env::set_var("LEAD_PILOT__PIPELINE__LEAK_POLICY", "annotate");
        env::set_var("LEAD_PILOT__PIPELINE__GHOST_THRESHOLD_DAYS", "5");
        env::set_var("LEAD_PILOT__PIPELINE__AGENT_NAME", "Maya");
        env::set_var("LEAD_PILOT__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.has_generator());
        assert_eq!(config.generator.model, "gpt-4o");
        assert_eq!(config.generator.timeout_secs, 15);
        assert_eq!(config.pipeline.leak_policy, LeakPolicy::Annotate);
        assert_eq!(config.pipeline.ghost_threshold_days, 5.0);
        assert_eq!(config.pipeline.agent_name, "Maya");
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_invalid_section() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("LEAD_PILOT__CHANNEL__MAX_LENGTH", "10");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidTruncation)
        );
    }
}
