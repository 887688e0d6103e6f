//! Non-mutating safety audit of outbound text.
//!
//! Reports every reason a candidate reply looks unsafe, without changing it.
//! Used for logging next to the sanitizer, which does the actual scrubbing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// One reason a reply failed the audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule: &'static str,
    pub reason: String,
}

/// Result of auditing one reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyReport {
    pub is_safe: bool,
    pub violations: Vec<Violation>,
}

impl SafetyReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            is_safe: violations.is_empty(),
            violations,
        }
    }
}

struct AuditCheck {
    rule: &'static str,
    reason: &'static str,
    regex: Regex,
}

fn check(rule: &'static str, reason: &'static str, pattern: &str) -> AuditCheck {
    AuditCheck {
        rule,
        reason,
        regex: Regex::new(pattern).expect("built-in audit pattern compiles"),
    }
}

static CHECKS: Lazy<Vec<AuditCheck>> = Lazy::new(|| {
    vec![
        check(
            "capabilities",
            "Response mentions capabilities or internal systems",
            r"(?i)capabilities|internal systems",
        ),
        check(
            "skill_activation",
            "Response mentions skill activation",
            r"(?i)skill.*activate|activated skill",
        ),
        check(
            "internal_markers",
            "Response contains internal context markers",
            r"(?i)<internal|\[INTERNAL\]|---THOUGHT_START---",
        ),
        check(
            "code",
            "Response contains code-like syntax",
            r"\b(?:function|const|let|var)\s+\w+\s*(?:=|\()|=>",
        ),
        check(
            "credentials",
            "Response contains a credential-shaped string",
            r"(?i)\bBearer\s+\S+|\bAuthorization\s*:|\bsk-[A-Za-z0-9_\-]{16,}|\beyJ[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]+\.",
        ),
        check(
            "vendor",
            "Response names a vendor or platform",
            r"(?i)\b(?:openai|anthropic|gemini|dialogflow|chatgpt|hubspot|supabase)\b",
        ),
    ]
});

/// Technical terms reported individually.
const TECHNICAL_TERMS: &[&str] = &[
    "supabase",
    "edge function",
    "database query",
    "API key",
    "invoke",
    "endpoint",
    "payload",
];

static TECHNICAL_TERM_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    TECHNICAL_TERMS
        .iter()
        .map(|term| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
            (*term, Regex::new(&pattern).expect("escaped term compiles"))
        })
        .collect()
});

/// Audits replies without mutating them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyAudit;

impl SafetyAudit {
    pub fn new() -> Self {
        Self
    }

    pub fn audit(&self, text: &str) -> SafetyReport {
        let mut violations: Vec<Violation> = CHECKS
            .iter()
            .filter(|check| check.regex.is_match(text))
            .map(|check| Violation {
                rule: check.rule,
                reason: check.reason.to_string(),
            })
            .collect();

        violations.extend(
            TECHNICAL_TERM_PATTERNS
                .iter()
                .filter(|(_, regex)| regex.is_match(text))
                .map(|(term, _)| Violation {
                    rule: "technical_term",
                    reason: format!("Response contains technical term: \"{term}\""),
                }),
        );

        SafetyReport::from_violations(violations)
    }
}
