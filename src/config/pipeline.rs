//! Dialogue pipeline configuration

use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use super::error::ConfigValidationError;
use crate::domain::pipeline::{
    LeakPolicy, PlannerSettings, DEFAULT_DEFLECTION_REPLY, DEFAULT_GHOST_THRESHOLD_DAYS,
};
use crate::domain::prompt::PersonaScript;
use crate::domain::safety::{
    FilterSettings, DEFAULT_FALLBACK_REPLY, DEFAULT_MAX_REPLY_CHARS, DEFAULT_TEMPLATE_MARKERS,
};

/// Pipeline behaviour and persona
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Days of silence before a lead is treated as ghosted
    #[serde(default = "default_ghost_threshold")]
    pub ghost_threshold_days: f64,

    /// `short_circuit` or `annotate`
    #[serde(default)]
    pub leak_policy: LeakPolicy,

    /// Sent when the generator fails or its reply is unusable
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,

    /// Sent when a leak probe is short-circuited
    #[serde(default = "default_deflection_reply")]
    pub deflection_reply: String,

    /// Longest generated reply accepted, in characters
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,

    /// Agent first name used in the persona script
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Business name used in the persona script
    #[serde(default = "default_brand")]
    pub brand: String,

    /// Opening hour, local time
    #[serde(default = "default_open_hour")]
    pub open_hour: u32,

    /// Closing hour, local time
    #[serde(default = "default_close_hour")]
    pub close_hour: u32,

    /// Business time zone as an offset from UTC
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

impl PipelineConfig {
    /// Planner settings for the turn planner
    pub fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings {
            ghost_threshold_days: self.ghost_threshold_days,
            leak_policy: self.leak_policy,
            deflection_reply: self.deflection_reply.clone(),
            open_hour: self.open_hour,
            close_hour: self.close_hour,
        }
    }

    /// Delivery guard settings for the output safety filter
    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            fallback_reply: self.fallback_reply.clone(),
            max_reply_chars: self.max_reply_chars,
            template_markers: DEFAULT_TEMPLATE_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    pub fn persona_script(&self) -> PersonaScript {
        PersonaScript::new(&self.agent_name, &self.brand)
    }

    /// Business time zone, `None` when the offset is out of range
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
    }

    /// Current time in the business time zone
    pub fn local_now(&self) -> Option<DateTime<FixedOffset>> {
        self.utc_offset().map(|offset| Utc::now().with_timezone(&offset))
    }

    /// Validate pipeline configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.ghost_threshold_days.is_finite() || self.ghost_threshold_days <= 0.0 {
            return Err(ConfigValidationError::InvalidGhostThreshold);
        }
        if self.fallback_reply.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("PIPELINE__FALLBACK_REPLY"));
        }
        if self.deflection_reply.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("PIPELINE__DEFLECTION_REPLY"));
        }
        if self.agent_name.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("PIPELINE__AGENT_NAME"));
        }
        if self.max_reply_chars == 0 {
            return Err(ConfigValidationError::InvalidReplyCeiling);
        }
        if self.open_hour >= self.close_hour || self.close_hour > 24 {
            return Err(ConfigValidationError::InvalidBusinessHours);
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigValidationError::InvalidUtcOffset);
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ghost_threshold_days: default_ghost_threshold(),
            leak_policy: LeakPolicy::default(),
            fallback_reply: default_fallback_reply(),
            deflection_reply: default_deflection_reply(),
            max_reply_chars: default_max_reply_chars(),
            agent_name: default_agent_name(),
            brand: default_brand(),
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
            utc_offset_hours: default_utc_offset(),
        }
    }
}

fn default_ghost_threshold() -> f64 {
    DEFAULT_GHOST_THRESHOLD_DAYS
}

fn default_fallback_reply() -> String {
    DEFAULT_FALLBACK_REPLY.to_string()
}

fn default_deflection_reply() -> String {
    DEFAULT_DEFLECTION_REPLY.to_string()
}

fn default_max_reply_chars() -> usize {
    DEFAULT_MAX_REPLY_CHARS
}

fn default_agent_name() -> String {
    "Lisa".to_string()
}

fn default_brand() -> String {
    "PTD Fitness".to_string()
}

fn default_open_hour() -> u32 {
    8
}

fn default_close_hour() -> u32 {
    21
}

// Gulf Standard Time
fn default_utc_offset() -> i32 {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.leak_policy, LeakPolicy::ShortCircuit);
        assert_eq!(config.planner_settings(), PlannerSettings::default());
        assert_eq!(config.filter_settings(), FilterSettings::default());
        assert_eq!(config.persona_script(), PersonaScript::default());
    }

    #[test]
    fn test_local_now_uses_offset() {
        let config = PipelineConfig::default();
        let now = config.local_now().unwrap();
        assert_eq!(now.offset().local_minus_utc(), 4 * 3600);
    }

    #[test]
    fn test_validate_rejects_bad_hours() {
        let config = PipelineConfig {
            open_hour: 22,
            close_hour: 9,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidBusinessHours));
    }

    #[test]
    fn test_validate_rejects_non_positive_ghost_threshold() {
        let config = PipelineConfig {
            ghost_threshold_days: 0.0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidGhostThreshold));
    }

    #[test]
    fn test_validate_rejects_blank_fallback() {
        let config = PipelineConfig {
            fallback_reply: "  ".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MissingRequired(_))
        ));
    }
}
