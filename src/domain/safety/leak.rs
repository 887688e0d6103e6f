//! Leak-probe detection on inbound messages.
//!
//! A probe is a message fishing for the agent's instructions, tools or
//! capabilities. Detection is a signal for the planner, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::error::{compile, PatternError};
use crate::domain::foundation::contains_any;

/// Built-in probe patterns, case-insensitive.
pub const DEFAULT_PROBES: &[&str] = &[
    r"(?i)what (skills?|capabilities|functions?|tools?) (do you|can you)",
    r"(?i)list (all )?your (skills?|capabilities|functions?|tools?)",
    r"(?i)show me your (system )?(prompt|instructions|capabilities)",
    r"(?i)what can you do",
    r"(?i)tell me about your (functions?|abilities|capabilities)",
    r"(?i)(ignore|disregard) (all )?(your |the )?previous instructions",
    r"(?i)(reveal|print|repeat|output) (your|the) (system )?(prompt|instructions)",
    r"(?i)what (is|are) your (system )?(prompt|instructions)",
];

/// Words that make a benign message slightly suspicious.
const SOFT_SIGNALS: &[&str] = &["prompt", "instruction", "capabilit", "skill"];

const MATCH_CONFIDENCE: f64 = 0.9;
const EXTRA_MATCH_BONUS: f64 = 0.03;
const MAX_CONFIDENCE: f64 = 0.99;
const SOFT_CONFIDENCE: f64 = 0.1;

static DEFAULT_DETECTOR: Lazy<LeakDetector> = Lazy::new(|| {
    LeakDetector::from_patterns(DEFAULT_PROBES.iter().copied())
        .expect("built-in probe patterns compile")
});

/// Outcome of probing one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeakVerdict {
    pub has_leak: bool,
    /// 0.0..=1.0
    pub confidence: f64,
}

impl LeakVerdict {
    pub fn clear() -> Self {
        Self {
            has_leak: false,
            confidence: 0.0,
        }
    }
}

/// Matches inbound text against a corpus of probe patterns.
#[derive(Debug, Clone)]
pub struct LeakDetector {
    probes: Vec<Regex>,
}

impl Default for LeakDetector {
    fn default() -> Self {
        DEFAULT_DETECTOR.clone()
    }
}

impl LeakDetector {
    /// Compiles a probe corpus.
    pub fn from_patterns<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<Self, PatternError> {
        let probes = patterns
            .into_iter()
            .enumerate()
            .map(|(i, pattern)| compile(&format!("leak_probe_{i}"), pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { probes })
    }

    /// Adds probes to the built-in corpus.
    pub fn with_additional_probes(mut self, patterns: &[String]) -> Result<Self, PatternError> {
        let offset = self.probes.len();
        for (i, pattern) in patterns.iter().enumerate() {
            self.probes.push(compile(&format!("leak_probe_{}", offset + i), pattern)?);
        }
        Ok(self)
    }

    pub fn detect(&self, text: &str) -> LeakVerdict {
        let hits = self.probes.iter().filter(|probe| probe.is_match(text)).count();
        if hits > 0 {
            let confidence =
                (MATCH_CONFIDENCE + EXTRA_MATCH_BONUS * (hits - 1) as f64).min(MAX_CONFIDENCE);
            tracing::warn!(hits, confidence, "leak probe detected");
            return LeakVerdict {
                has_leak: true,
                confidence,
            };
        }
        let confidence = if contains_any(text, SOFT_SIGNALS) {
            SOFT_CONFIDENCE
        } else {
            0.0
        };
        LeakVerdict {
            has_leak: false,
            confidence,
        }
    }
}
