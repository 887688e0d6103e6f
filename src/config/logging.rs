//! Logging configuration

use serde::Deserialize;

use super::error::ConfigValidationError;

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Filter directive scoping the level to this crate
    pub fn filter_directive(&self) -> String {
        format!("lead_pilot={}", self.level.to_lowercase())
    }

    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigValidationError::InvalidLogLevel(self.level.clone()));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
