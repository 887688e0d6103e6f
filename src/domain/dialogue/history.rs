//! Recent conversation turns supplied by the caller.

use serde::{Deserialize, Serialize};

/// Who wrote a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Lead,
    Agent,
}

/// One message of recent history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ConversationTurn {
    pub fn lead(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Lead,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.into(),
        }
    }
}

/// Returns the last `limit` turns, oldest first.
pub fn recent(history: &[ConversationTurn], limit: usize) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(limit);
    &history[start..]
}
