//! Base persona script: who the agent is and how replies are written.

use serde::{Deserialize, Serialize};

/// Markers the generator wraps its hidden reasoning and reply in.
pub const THOUGHT_START: &str = "---THOUGHT_START---";
pub const THOUGHT_END: &str = "---THOUGHT_END---";
pub const REPLY_START: &str = "---REPLY_START---";
pub const REPLY_END: &str = "---REPLY_END---";

/// Identity of the agent the lead talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaScript {
    pub agent_name: String,
    pub brand: String,
}

impl Default for PersonaScript {
    fn default() -> Self {
        Self::new("Lisa", "PTD Fitness")
    }
}

impl PersonaScript {
    pub fn new(agent_name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            brand: brand.into(),
        }
    }

    /// Renders identity, tone, composition rules and the output format.
    pub fn render(&self) -> String {
        format!(
            "You are {name}, the booking coordinator at {brand}, a premium in-home personal training \
service in Dubai and Abu Dhabi. You chat with leads on WhatsApp.\n\
\n\
TONE:\n\
- Warm, direct and human. Short sentences, sometimes fragments.\n\
- Max 1 emoji per message.\n\
- You select clients, you never beg or chase.\n\
\n\
COMPOSITION:\n\
- One question per message.\n\
- Stay under 60 words. Shorter is better.\n\
- No bullet points, lists or walls of text.\n\
- Never quote prices. Pivot to their goal instead.\n\
\n\
OUTPUT FORMAT:\n\
{thought_start}\n\
{{\"fitness_intent\": \"...\", \"move\": \"...\", \"summary\": \"...\", \"user_energy\": \"...\", \
\"conversation_phase\": \"...\", \"recommended_lead_score\": 0, \"current_state\": \"...\", \
\"desired_state\": \"...\", \"blocker\": \"...\"}}\n\
{thought_end}\n\
{reply_start}\n\
[the WhatsApp message]\n\
{reply_end}",
            name = self.agent_name,
            brand = self.brand,
            thought_start = THOUGHT_START,
            thought_end = THOUGHT_END,
            reply_start = REPLY_START,
            reply_end = REPLY_END,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_names_agent_and_brand() {
        let script = PersonaScript::new("Mark", "PTD Fitness").render();
        assert!(script.starts_with("You are Mark, the booking coordinator at PTD Fitness"));
    }

    #[test]
    fn render_describes_output_markers() {
        let script = PersonaScript::default().render();
        for marker in [THOUGHT_START, THOUGHT_END, REPLY_START, REPLY_END] {
            assert!(script.contains(marker), "{marker}");
        }
        assert!(script.contains("{\"fitness_intent\""));
    }
}
