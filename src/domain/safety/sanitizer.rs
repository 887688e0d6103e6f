//! Outbound sanitization.
//!
//! Folds an ordered catalogue of (pattern, replacement) rules over the
//! candidate reply, then normalises whitespace and enforces the hard length
//! ceiling. The whole pass is repeated until the text stops changing, so
//! removing one match can never leave behind a new one and the result is
//! idempotent.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::{compile, PatternError};

/// Hard ceiling applied by the sanitizer, in characters.
pub const SANITIZER_CEILING: usize = 4096;
/// Marker appended when the ceiling truncates.
pub const SANITIZER_MARKER: &str = "...";

const MAX_PASSES: usize = 32;

/// One catalogue entry. Patterns use `regex` syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizationRule {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

impl SanitizationRule {
    pub fn strip(name: &str, pattern: &str) -> Self {
        Self::replace(name, pattern, "")
    }

    pub fn replace(name: &str, pattern: &str, replacement: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// Internal marker tags removed when bracketed. Other bracketed text is kept.
pub const MARKER_TAGS: &[&str] = &[
    "INTERNAL", "AVATAR", "PERSONA", "STAGE", "STRATEGY", "CONTEXT", "LEAD_CONTEXT", "KB",
    "SKILL", "THOUGHT", "SYSTEM", "INST",
];

/// The built-in catalogue, in application order.
pub fn default_rules() -> Vec<SanitizationRule> {
    let marker_tags = format!(
        r"(?i)\[/?(?:{})(?:_[A-Z_]+)?(?:[:\s][^\]\n]*)?\]",
        MARKER_TAGS.join("|")
    );
    vec![
        SanitizationRule::strip("internal_block", r"(?is)\[INTERNAL\].*?\[/INTERNAL\]"),
        SanitizationRule::strip("internal_context_block", r"(?is)<internal_context>.*?</internal_context>"),
        SanitizationRule::strip("thought_block", r"(?s)---THOUGHT_START---.*?---THOUGHT_END---"),
        SanitizationRule::strip("reply_markers", r"---(?:REPLY|THOUGHT)_(?:START|END)---"),
        SanitizationRule::strip("skill_activation", r"(?i)(?:!!!\s*)?ACTIVE SKILL ACTIVATED:[^\n]*"),
        SanitizationRule::strip("marker_tags", &marker_tags),
        SanitizationRule::strip("mustache", r"\{\{[^{}]*\}\}"),
        SanitizationRule::strip("chat_template_tokens", r"<\|[A-Za-z_]+\|>|<</?SYS>>"),
        SanitizationRule::strip("xml_tags", r"</?[A-Za-z_][A-Za-z0-9_:-]*(?:\s[^<>]*)?/?>"),
        SanitizationRule::strip("capability_lines", r"(?im)^.*\b(?:CAPABILITIES|internal_rules|available_tools)\s*:.*$"),
        SanitizationRule::strip("internal_identifiers", r"(?i)AGENT_KNOWLEDGE_BASE|INTERNAL_TOOL|\bSKILL_\w*"),
        SanitizationRule::strip("code_function", r"(?i)\bfunction\s+\w+\s*\([^)\n]*\)?"),
        SanitizationRule::strip("code_binding", r"\b(?:const|let|var)\s+\w+\s*="),
        SanitizationRule::strip("code_calls", r#"(?i)\bsupabase\.\w*|\.from\(['"][^'"]*['"]\)|\binvoke\(|\bdeno\.\w*"#),
        SanitizationRule::strip("sql", r"(?i)\bSELECT\s+\*\s+FROM\b\s*\w*"),
        SanitizationRule::strip("authorization_header", r"(?i)\bAuthorization\s*:\s*(?:(?:Bearer|Basic)\b\s*)?\S*"),
        SanitizationRule::strip("bearer_token", r"(?i)\bBearer\s+[A-Za-z0-9\-_.=]+"),
        SanitizationRule::strip(
            "api_keys",
            r"\b(?:sk-[A-Za-z0-9_\-]{16,}|AKIA[0-9A-Z]{16}|gh[pousr]_[A-Za-z0-9]{20,}|xox[abprs]-[A-Za-z0-9\-]{10,})",
        ),
        SanitizationRule::strip("jwt", r"\beyJ[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]+"),
        SanitizationRule::strip("secret_assignment", r"(?i)\b(?:api[_\s-]?key|secret|password|token)\b\s*[:=]\s*\S+"),
        SanitizationRule::strip("api_key_mention", r"(?i)\bapi[_\s-]?key\b"),
        SanitizationRule::strip(
            "vendor_names",
            r"(?i)\b(?:openai|anthropic|gemini|google|dialogflow|chatgpt|hubspot|supabase|langchain|gpt-?\d[\w.\-]*)\b",
        ),
        // Claude is also a first name; only model-shaped mentions are stripped.
        SanitizationRule::strip(
            "model_names",
            r"(?i)\bclaude(?:\.ai\b|\s+ai\b|[\s-]+(?:\d[\w.\-]*|opus|sonnet|haiku|instant)\b)",
        ),
        SanitizationRule::strip(
            "ai_self_reference",
            r"(?i)\b(?:as an ai|you are an ai|language model|system prompt|prompt instructions|ignore previous instructions)\b",
        ),
        SanitizationRule::strip("infrastructure", r"(?i)\bedge[\s-]?functions?\b"),
        SanitizationRule::replace("database", r"(?i)\bdatabase\b", "our records"),
        SanitizationRule::strip("ai_isms", r"(?i)\b(?:certainly|of course)!"),
    ]
}

static DEFAULT_SANITIZER: Lazy<Sanitizer> = Lazy::new(|| {
    Sanitizer::from_rules(&default_rules()).expect("built-in sanitization rules compile")
});

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));
static TRAILING_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").expect("valid regex"));
static LEADING_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]+").expect("valid regex"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    regex: Regex,
    replacement: String,
}

/// Scrubs generated text before it can reach a lead.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    rules: Vec<CompiledRule>,
    ceiling: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        DEFAULT_SANITIZER.clone()
    }
}

impl Sanitizer {
    /// Compiles a catalogue.
    pub fn from_rules(rules: &[SanitizationRule]) -> Result<Self, PatternError> {
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    name: rule.name.clone(),
                    regex: compile(&rule.name, &rule.pattern)?,
                    replacement: rule.replacement.clone(),
                })
            })
            .collect::<Result<Vec<_>, PatternError>>()?;
        Ok(Self {
            rules,
            ceiling: SANITIZER_CEILING,
        })
    }

    /// Appends rules after the existing catalogue.
    pub fn with_additional_rules(mut self, extra: &[SanitizationRule]) -> Result<Self, PatternError> {
        let compiled = Self::from_rules(extra)?;
        self.rules.extend(compiled.rules);
        Ok(self)
    }

    /// Overrides the length ceiling. Values below the marker length are raised to it.
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = ceiling.max(SANITIZER_MARKER.len() + 1);
        self
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Names of the rules, in application order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// Sanitizes text. Idempotent.
    ///
    /// # Steps
    /// 1. Apply every catalogue rule in order
    /// 2. Collapse space runs and blank-line runs, trim
    /// 3. Truncate to the ceiling with a trailing marker
    /// 4. Repeat until nothing changes
    pub fn sanitize(&self, text: &str) -> String {
        let mut current = text.to_string();
        for _ in 0..MAX_PASSES {
            let next = self.single_pass(&current);
            if next == current {
                return next;
            }
            current = next;
        }
        tracing::warn!("sanitizer did not settle within {} passes", MAX_PASSES);
        current
    }

    fn single_pass(&self, text: &str) -> String {
        let mut result = text.to_string();
        for rule in &self.rules {
            if rule.regex.is_match(&result) {
                tracing::debug!(rule = %rule.name, "sanitization rule applied");
                result = rule
                    .regex
                    .replace_all(&result, rule.replacement.as_str())
                    .into_owned();
            }
        }
        let result = self.normalize_whitespace(&result);
        self.enforce_ceiling(result)
    }

    fn normalize_whitespace(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n");
        let text = SPACE_RUNS.replace_all(&text, " ");
        let text = TRAILING_SPACE.replace_all(&text, "\n");
        let text = LEADING_SPACE.replace_all(&text, "\n");
        let text = BLANK_RUNS.replace_all(&text, "\n\n");
        text.trim().to_string()
    }

    fn enforce_ceiling(&self, text: String) -> String {
        if text.chars().count() <= self.ceiling {
            return text;
        }
        let keep = self.ceiling - SANITIZER_MARKER.len();
        let mut truncated: String = text.chars().take(keep).collect();
        truncated.push_str(SANITIZER_MARKER);
        truncated
    }
}
