//! Splits raw generator output into hidden reasoning and the reply.
//!
//! The generator is asked to emit a JSON self-assessment between thought
//! markers and the user-facing message between reply markers. Either part
//! may be missing or malformed; parsing never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::lenient_u32;

/// Replies longer than this many words are cut.
pub const MAX_REPLY_WORDS: usize = 60;
/// Words kept when a reply is cut.
pub const KEPT_REPLY_WORDS: usize = 50;

static THOUGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)---THOUGHT_START---(.*?)---THOUGHT_END---").expect("valid regex")
});
static REPLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)---REPLY_START---(.*?)---REPLY_END---").expect("valid regex"));

/// Generator self-assessment. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternalThought {
    pub fitness_intent: Option<String>,
    pub user_felt_heard: Option<String>,
    #[serde(rename = "move")]
    pub next_move: Option<String>,
    pub summary: Option<String>,
    pub user_energy: Option<String>,
    pub conversation_phase: Option<String>,
    pub lead_temperature: Option<String>,
    pub psychological_profile: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub recommended_lead_score: Option<u32>,
    pub current_state: Option<String>,
    pub desired_state: Option<String>,
    pub blocker: Option<String>,
}

/// Parsed generator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReply {
    pub thought: Option<InternalThought>,
    pub reply: String,
    #[serde(skip)]
    pub raw: String,
}

/// Parses generator output, substituting a fallback for empty replies.
#[derive(Debug, Clone)]
pub struct ReplyParser {
    fallback_reply: String,
}

impl ReplyParser {
    pub fn new(fallback_reply: impl Into<String>) -> Self {
        Self {
            fallback_reply: fallback_reply.into(),
        }
    }

    pub fn parse(&self, raw: &str) -> ParsedReply {
        let thought = THOUGHT.captures(raw).and_then(|caps| {
            let body = caps.get(1).map_or("", |m| m.as_str()).trim();
            match serde_json::from_str::<InternalThought>(body) {
                Ok(thought) => Some(thought),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to parse internal thought");
                    None
                }
            }
        });

        let reply = match REPLY.captures(raw) {
            Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            None => THOUGHT.replace(raw, "").trim().to_string(),
        };
        let reply = if reply.is_empty() {
            self.fallback_reply.clone()
        } else {
            reply
        };

        ParsedReply {
            thought,
            reply: limit_words(&reply),
            raw: raw.to_string(),
        }
    }
}

fn limit_words(reply: &str) -> String {
    let words: Vec<&str> = reply.split_whitespace().collect();
    if words.len() <= MAX_REPLY_WORDS {
        return reply.to_string();
    }
    format!("{}...", words[..KEPT_REPLY_WORDS].join(" "))
}
