//! Text generator configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::adapters::ai::{OpenAICompatibleConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Text generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// API key; without one the binary runs in dry-run mode
    pub api_key: Option<Secret<String>>,

    /// Chat completions base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Adapter configuration, when an API key is set
    pub fn adapter_config(&self) -> Option<OpenAICompatibleConfig> {
        use secrecy::ExposeSecret;

        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .map(|key| {
                OpenAICompatibleConfig::from_secret(key.clone())
                    .with_model(&self.model)
                    .with_base_url(&self.base_url)
                    .with_timeout(self.timeout())
            })
    }

    /// Validate generator configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigValidationError::InvalidTemperature);
        }
        if self.max_tokens == 0 {
            return Err(ConfigValidationError::InvalidMaxTokens);
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigValidationError::InvalidBaseUrl);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("GENERATOR__MODEL"));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    400
}

fn default_timeout() -> u64 {
    20
}
