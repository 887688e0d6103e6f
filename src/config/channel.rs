//! Messaging channel configuration

use serde::Deserialize;

use super::error::ConfigValidationError;
use crate::domain::safety::{
    ChannelFormatter, CHANNEL_MAX_LENGTH, CHANNEL_TRUNCATE_AT, CHANNEL_TRUNCATION_MARKER,
    SANITIZER_CEILING, SANITIZER_MARKER,
};

/// Channel dialect and length limits
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Maximum characters per outbound message
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Characters kept when a message is truncated
    #[serde(default = "default_truncate_at")]
    pub truncate_at: usize,

    /// Appended to truncated messages
    #[serde(default = "default_marker")]
    pub truncation_marker: String,

    /// Hard ceiling applied by the sanitizer
    #[serde(default = "default_sanitizer_ceiling")]
    pub sanitizer_ceiling: usize,
}

impl ChannelConfig {
    /// Build the channel formatter
    pub fn formatter(&self) -> Result<ChannelFormatter, ConfigValidationError> {
        ChannelFormatter::new(self.max_length, self.truncate_at, self.truncation_marker.clone())
            .map_err(|_| ConfigValidationError::InvalidTruncation)
    }

    /// Validate channel configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.formatter()?;
        if self.sanitizer_ceiling <= SANITIZER_MARKER.len() {
            return Err(ConfigValidationError::InvalidSanitizerCeiling);
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            truncate_at: default_truncate_at(),
            truncation_marker: default_marker(),
            sanitizer_ceiling: default_sanitizer_ceiling(),
        }
    }
}

fn default_max_length() -> usize {
    CHANNEL_MAX_LENGTH
}

fn default_truncate_at() -> usize {
    CHANNEL_TRUNCATE_AT
}

fn default_marker() -> String {
    CHANNEL_TRUNCATION_MARKER.to_string()
}

fn default_sanitizer_ceiling() -> usize {
    SANITIZER_CEILING
}
