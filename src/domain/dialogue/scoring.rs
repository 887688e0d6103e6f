//! Rule-based lead scoring.
//!
//! A lead starts at 10 points, gains points for qualification and buying
//! signals and loses points for hesitation and inactivity. The result is
//! clamped to 0..=100.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::contains_any;
use crate::domain::lead::LeadProfile;

/// Lead score in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadScore(u8);

impl LeadScore {
    pub const MAX: u8 = 100;

    /// Creates a score, clamping out-of-range values.
    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(0, Self::MAX as i32) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Blends a generator-recommended score with the rule-based one (60/40).
    pub fn blend(self, recommended: Option<u32>) -> Self {
        match recommended {
            Some(ai) => {
                let ai = ai.min(Self::MAX as u32) as f64;
                Self::clamped((ai * 0.6 + self.0 as f64 * 0.4).round() as i32)
            }
            None => self,
        }
    }
}

impl std::fmt::Display for LeadScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observed qualification and buying signals for one turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadSignals {
    pub has_name: bool,
    pub has_goal: bool,
    pub has_pain: bool,
    pub has_area: bool,
    pub message_count: u32,
    pub asked_about_price: bool,
    pub asked_about_schedule: bool,
    pub mentioned_timeframe: bool,
    pub mentioned_past_failure: bool,
    pub expressed_urgency: bool,
    pub said_expensive: bool,
    pub said_think_about_it: bool,
    pub days_inactive: f64,
}

impl LeadSignals {
    /// Extracts signals from the profile and the inbound message.
    ///
    /// `has_pain` is supplied by the caller since it depends on how far the
    /// conversation has progressed.
    pub fn from_turn(
        profile: &LeadProfile,
        message: &str,
        message_count: u32,
        days_inactive: f64,
        has_pain: bool,
    ) -> Self {
        Self {
            has_name: profile
                .display_name()
                .map_or(false, |name| !name.eq_ignore_ascii_case("friend")),
            has_goal: profile.stated_goal().is_some(),
            has_pain,
            has_area: profile.area().is_some(),
            message_count,
            asked_about_price: contains_any(message, &["price", "cost", "aed"]),
            asked_about_schedule: contains_any(message, &["when", "book"]),
            mentioned_timeframe: contains_any(message, &["month", "week"]),
            mentioned_past_failure: contains_any(message, &["tried", "before"]),
            expressed_urgency: contains_any(message, &["asap", "now"]),
            said_expensive: contains_any(message, &["expensive"]),
            said_think_about_it: contains_any(message, &["think about"]),
            days_inactive,
        }
    }
}

/// Computes a lead score from signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadScorer;

impl LeadScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, signals: &LeadSignals) -> LeadScore {
        let mut score: i32 = 10;

        let adjustments = [
            (signals.has_name, 5),
            (signals.has_goal, 10),
            (signals.has_pain, 15),
            (signals.has_area, 5),
            (signals.asked_about_price, 10),
            (signals.asked_about_schedule, 20),
            (signals.mentioned_timeframe, 10),
            (signals.mentioned_past_failure, 10),
            (signals.expressed_urgency, 15),
            (signals.message_count >= 3, 5),
            (signals.message_count >= 6, 5),
            (signals.message_count >= 10, 5),
            (signals.said_expensive, -10),
            (signals.said_think_about_it, -5),
            (signals.days_inactive >= 1.0, -5),
            (signals.days_inactive >= 3.0, -10),
            (signals.days_inactive >= 7.0, -20),
        ];
        for (applies, points) in adjustments {
            if applies {
                score += points;
            }
        }

        LeadScore::clamped(score)
    }
}
