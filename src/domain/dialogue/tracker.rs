//! Dialogue state tracker.
//!
//! Decides the next funnel stage from the current stage and the inbound
//! message. Each stage is configured with a goal and trigger keywords; a
//! trigger moves the lead to the stage's configured successor. The tracker is
//! stateless: the caller persists the returned stage.

use serde::Serialize;

use super::stage::DialogueStage;
use crate::domain::foundation::{contains_any, first_match};

/// Keywords that jump straight to a target stage.
#[derive(Debug, Clone, Copy)]
pub struct StageShortcut {
    pub keywords: &'static [&'static str],
    pub target: DialogueStage,
}

/// Configuration of one stage.
#[derive(Debug, Clone, Copy)]
pub struct StageRule {
    pub stage: DialogueStage,
    /// Goal injected into the prompt while the lead is in this stage.
    pub goal: &'static str,
    pub triggers: &'static [&'static str],
    /// `None` for the terminal stage.
    pub next: Option<DialogueStage>,
    pub shortcut: Option<StageShortcut>,
}

impl StageRule {
    /// Every keyword that moves the lead out of this stage.
    pub fn all_triggers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.triggers
            .iter()
            .chain(self.shortcut.iter().flat_map(|s| s.keywords.iter()))
            .copied()
    }
}

/// Scheduling intent that books the assessment from Closing.
///
/// Matching is by substring, so affirmatives are whole phrases: a bare "yes"
/// or "sure" would also fire on "yesterday", "eyes", "not sure" or "pressure".
const BOOKING_INTENT: &[&str] = &[
    "book", "schedule", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday",
    "sunday", "tomorrow", "yes please", "yes let's", "yes, let's", "let's do it", "let's book",
    "sounds good", "sure thing", "count me in",
];

/// Stage rules, one per stage.
pub const STAGE_RULES: &[StageRule] = &[
    StageRule {
        stage: DialogueStage::Connection,
        goal: "Build rapport and find out the lead's main fitness goal.",
        triggers: &[
            "lose weight", "weight", "fat", "strength", "stronger", "muscle", "fit", "tone",
            "pain", "back", "goal", "want to", "looking to", "help",
        ],
        next: Some(DialogueStage::Situation),
        shortcut: None,
    },
    StageRule {
        stage: DialogueStage::Situation,
        goal: "Understand their current routine, schedule and what they have tried before.",
        triggers: &[
            "tried", "gym", "before", "currently", "used to", "work", "busy", "schedule",
            "routine", "years", "months",
        ],
        next: Some(DialogueStage::Problem),
        shortcut: None,
    },
    StageRule {
        stage: DialogueStage::Problem,
        goal: "Uncover the real obstacle and how it makes them feel.",
        triggers: &[
            "struggle", "frustrat", "hard", "stuck", "can't", "cannot", "motivation",
            "consisten", "quit", "gave up", "plateau", "injur",
        ],
        next: Some(DialogueStage::Solution),
        shortcut: None,
    },
    StageRule {
        stage: DialogueStage::Solution,
        goal: "Show how coached sessions solve their specific obstacle and invite them to a free assessment.",
        triggers: &[
            "how does it work", "interested", "sounds good", "tell me more", "what's next",
            "how much", "price", "cost", "assessment", "ready",
        ],
        next: Some(DialogueStage::Closing),
        shortcut: None,
    },
    StageRule {
        stage: DialogueStage::Closing,
        goal: "Agree a specific day and time for the free assessment.",
        triggers: &["morning", "evening", "afternoon", "slot", "works for me", "available"],
        next: Some(DialogueStage::Booked),
        shortcut: Some(StageShortcut {
            keywords: BOOKING_INTENT,
            target: DialogueStage::Booked,
        }),
    },
    StageRule {
        stage: DialogueStage::Booked,
        goal: "Confirm the booking details and set expectations for the first session.",
        triggers: &[],
        next: None,
        shortcut: None,
    },
    StageRule {
        stage: DialogueStage::Objection,
        goal: "Acknowledge the concern, reframe it around their goal and steer back to the solution.",
        triggers: &[
            "makes sense", "fair enough", "sounds fair", "okay", "ok let's", "that's fine",
            "let's do it", "let's go", "alright",
        ],
        next: Some(DialogueStage::Solution),
        shortcut: None,
    },
    StageRule {
        stage: DialogueStage::GhostRecovery,
        goal: "Re-open the conversation with a light, no-pressure check-in.",
        triggers: &[
            "hello", "hey there", "hi again", "still interested", "still keen", "sorry",
            "yes i am", "i'm back", "been busy",
        ],
        next: Some(DialogueStage::Situation),
        shortcut: None,
    },
];

/// Result of one tracking decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTransition {
    pub stage: DialogueStage,
    pub has_changed: bool,
    pub prompt_goal: String,
}

/// Keyword-driven funnel controller.
#[derive(Debug, Clone, Copy)]
pub struct StageTracker {
    rules: &'static [StageRule],
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self { rules: STAGE_RULES }
    }

    /// Returns the rule configured for a stage.
    pub fn rule(&self, stage: DialogueStage) -> &StageRule {
        self.rules
            .iter()
            .find(|rule| rule.stage == stage)
            .unwrap_or(&STAGE_RULES[0])
    }

    /// Goal string configured for a stage.
    pub fn goal(&self, stage: DialogueStage) -> &'static str {
        self.rule(stage).goal
    }

    /// Tracks from a stored stage identifier.
    ///
    /// An unrecognised identifier resets the lead to Connection and reports a
    /// change so the caller persists the repaired value.
    pub fn track(&self, current: &str, text: &str) -> StageTransition {
        match DialogueStage::from_id(current) {
            Some(stage) => self.advance(stage, text),
            None => {
                tracing::warn!(stage = current, "unrecognised stage, resetting to connection");
                self.transition(DialogueStage::Connection, true)
            }
        }
    }

    /// Decides the next stage for a known current stage.
    pub fn advance(&self, current: DialogueStage, text: &str) -> StageTransition {
        let rule = self.rule(current);

        if let Some(next) = rule.next {
            if let Some(keyword) = first_match(text, rule.triggers) {
                tracing::info!(from = %current, to = %next, keyword, "stage advanced");
                return self.transition(next, true);
            }
        }

        if let Some(shortcut) = rule.shortcut {
            if contains_any(text, shortcut.keywords) {
                tracing::info!(from = %current, to = %shortcut.target, "stage shortcut taken");
                return self.transition(shortcut.target, true);
            }
        }

        self.transition(current, false)
    }

    fn transition(&self, stage: DialogueStage, has_changed: bool) -> StageTransition {
        StageTransition {
            stage,
            has_changed,
            prompt_goal: self.goal(stage).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::StateMachine;
    use proptest::prelude::*;

    fn tracker() -> StageTracker {
        StageTracker::new()
    }

    mod configuration {
        use super::*;

        #[test]
        fn every_stage_has_exactly_one_rule() {
            for stage in DialogueStage::ALL {
                let count = STAGE_RULES.iter().filter(|r| r.stage == stage).count();
                assert_eq!(count, 1, "{stage}");
            }
        }

        #[test]
        fn configured_successors_are_valid_transitions() {
            for rule in STAGE_RULES {
                if let Some(next) = rule.next {
                    assert!(rule.stage.can_transition_to(&next), "{} -> {}", rule.stage, next);
                }
                if let Some(shortcut) = rule.shortcut {
                    assert!(rule.stage.can_transition_to(&shortcut.target));
                }
            }
        }

        #[test]
        fn only_terminal_stage_has_no_successor() {
            for rule in STAGE_RULES {
                assert_eq!(rule.next.is_none(), rule.stage.is_terminal(), "{}", rule.stage);
            }
        }
    }

    mod scenarios {
        use super::*;

        #[test]
        fn lose_weight_moves_connection_to_situation() {
            let result = tracker().track("connection", "I want to lose weight");
            assert_eq!(result.stage, DialogueStage::Situation);
            assert!(result.has_changed);
            assert_eq!(result.prompt_goal, tracker().goal(DialogueStage::Situation));
        }

        #[test]
        fn legacy_identifier_is_accepted() {
            let result = tracker().track("1_CONNECTION", "I want to lose weight");
            assert_eq!(result.stage, DialogueStage::Situation);
        }

        #[test]
        fn no_trigger_stays_put() {
            let result = tracker().advance(DialogueStage::Problem, "ok");
            assert_eq!(result.stage, DialogueStage::Problem);
            assert!(!result.has_changed);
            assert_eq!(result.prompt_goal, tracker().goal(DialogueStage::Problem));
        }

        #[test]
        fn closing_shortcut_books_on_day_name() {
            let result = tracker().advance(DialogueStage::Closing, "Thursday?");
            assert_eq!(result.stage, DialogueStage::Booked);
            assert!(result.has_changed);
        }

        #[test]
        fn closing_shortcut_books_on_affirmative() {
            let result = tracker().advance(DialogueStage::Closing, "Yes please");
            assert_eq!(result.stage, DialogueStage::Booked);
        }

        #[test]
        fn closing_stated_objection_does_not_book() {
            let result = tracker().advance(DialogueStage::Closing, "I'm not sure, it's too expensive");
            assert_eq!(result.stage, DialogueStage::Closing);
            assert!(!result.has_changed);
        }

        #[test]
        fn closing_words_containing_affirmatives_do_not_book() {
            for text in ["I was busy yesterday", "no pressure but my eyes hurt"] {
                let result = tracker().advance(DialogueStage::Closing, text);
                assert_eq!(result.stage, DialogueStage::Closing, "{text}");
            }
        }

        #[test]
        fn booking_intent_outside_closing_does_not_book() {
            let result = tracker().advance(DialogueStage::Connection, "Monday");
            assert_eq!(result.stage, DialogueStage::Connection);
        }

        #[test]
        fn booked_never_moves() {
            let result = tracker().advance(DialogueStage::Booked, "yes book me again please");
            assert_eq!(result.stage, DialogueStage::Booked);
            assert!(!result.has_changed);
        }

        #[test]
        fn unknown_stage_resets_to_connection() {
            let result = tracker().track("7_UPSELL", "hello");
            assert_eq!(result.stage, DialogueStage::Connection);
            assert!(result.has_changed);
            assert_eq!(result.prompt_goal, tracker().goal(DialogueStage::Connection));
        }

        #[test]
        fn objection_resolves_into_solution() {
            let result = tracker().advance(DialogueStage::Objection, "Okay that makes sense");
            assert_eq!(result.stage, DialogueStage::Solution);
        }

        #[test]
        fn objection_is_not_resolved_by_embedded_ok() {
            let result = tracker().advance(DialogueStage::Objection, "let me look at my bookings, still unfair");
            assert_eq!(result.stage, DialogueStage::Objection);
            assert!(!result.has_changed);
        }

        #[test]
        fn ghost_recovery_ignores_embedded_greetings() {
            let result = tracker().advance(DialogueStage::GhostRecovery, "they gave feedback, not interested");
            assert_eq!(result.stage, DialogueStage::GhostRecovery);
            assert!(!result.has_changed);
        }

        #[test]
        fn ghost_recovery_resumes_at_situation() {
            let result = tracker().advance(DialogueStage::GhostRecovery, "Sorry, been busy!");
            assert_eq!(result.stage, DialogueStage::Situation);
        }
    }

    /// Words that contain a short keyword without meaning it.
    fn lookalike_text(stage: DialogueStage) -> impl Strategy<Value = String> {
        let words: &'static [&'static str] = match stage {
            DialogueStage::Closing => &["not sure", "unsure", "pressure", "eyes", "yesterday", "measure"],
            DialogueStage::Objection => &["look", "token", "unfair", "not sure", "pressure", "broke"],
            _ => &["they", "whey", "feedback", "backpack", "eyes", "not interested"],
        };
        proptest::collection::vec(proptest::sample::select(words), 1..5)
            .prop_map(|picked| picked.join(" "))
    }

    fn lookalike_case() -> impl Strategy<Value = (DialogueStage, String)> {
        proptest::sample::select(vec![
            DialogueStage::Closing,
            DialogueStage::Objection,
            DialogueStage::GhostRecovery,
        ])
        .prop_flat_map(|stage| (Just(stage), lookalike_text(stage)))
    }

    fn stage_strategy() -> impl Strategy<Value = DialogueStage> {
        proptest::sample::select(DialogueStage::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn text_without_triggers_never_changes_stage(stage in stage_strategy(), text in "[0-9 .!?#]{0,40}") {
            let rule = *tracker().rule(stage);
            prop_assume!(!rule.all_triggers().any(|k| text.to_lowercase().contains(k)));
            let result = tracker().advance(stage, &text);
            prop_assert_eq!(result.stage, stage);
            prop_assert!(!result.has_changed);
        }

        #[test]
        fn lookalike_words_never_fire_short_keywords((stage, text) in lookalike_case()) {
            let result = tracker().advance(stage, &text);
            prop_assert_eq!(result.stage, stage);
            prop_assert!(!result.has_changed);
        }

        #[test]
        fn any_trigger_moves_to_configured_next(
            stage in stage_strategy(),
            index in any::<proptest::sample::Index>(),
            prefix in "[a-z ]{0,10}",
            upper in any::<bool>(),
        ) {
            let rule = *tracker().rule(stage);
            prop_assume!(!rule.triggers.is_empty());
            let keyword = rule.triggers[index.index(rule.triggers.len())];
            let keyword = if upper { keyword.to_uppercase() } else { keyword.to_string() };
            let text = format!("{prefix}{keyword}");
            let result = tracker().advance(stage, &text);
            prop_assert_eq!(Some(result.stage), rule.next);
            prop_assert!(result.has_changed);
        }
    }
}
