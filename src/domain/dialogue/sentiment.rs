//! Keyword sentiment triage of inbound messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::first_match;

/// Coarse mood of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    /// Complaint, threat or opt-out. Selling stops for the turn.
    Risk,
    Positive,
    Neutral,
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::Neutral
    }
}

const RISK_KEYWORDS: &[&str] = &[
    "scam",
    "refund",
    "complain",
    "lawyer",
    "police",
    "angry",
    "stop messaging",
    "stop texting",
    "leave me alone",
    "report",
    "harass",
    "unsubscribe",
];

const POSITIVE_KEYWORDS: &[&str] = &["great", "love", "amazing", "thanks", "thank you", "excited", "awesome"];

/// Classifies inbound text; risk outranks positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentTriage;

impl SentimentTriage {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, text: &str) -> Sentiment {
        if let Some(keyword) = first_match(text, RISK_KEYWORDS) {
            tracing::warn!(keyword, "risk sentiment detected");
            return Sentiment::Risk;
        }
        if first_match(text, POSITIVE_KEYWORDS).is_some() {
            return Sentiment::Positive;
        }
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_risk() {
        let triage = SentimentTriage::new();
        assert_eq!(triage.analyze("This is a SCAM"), Sentiment::Risk);
        assert_eq!(triage.analyze("please stop messaging me"), Sentiment::Risk);
    }

    #[test]
    fn risk_outranks_positive() {
        assert_eq!(
            SentimentTriage::new().analyze("thanks but I want a refund"),
            Sentiment::Risk
        );
    }

    #[test]
    fn detects_positive() {
        assert_eq!(SentimentTriage::new().analyze("Amazing, thanks!"), Sentiment::Positive);
    }

    #[test]
    fn defaults_to_neutral() {
        assert_eq!(SentimentTriage::new().analyze("I live in JLT"), Sentiment::Neutral);
        assert_eq!(SentimentTriage::new().analyze(""), Sentiment::Neutral);
    }
}
