//! Funnel stages of a sales conversation.
//!
//! The forward progression runs Connection → Situation → Problem → Solution →
//! Closing → Booked. Objection and GhostRecovery are cross-cutting: any
//! non-terminal stage may enter them, and each resolves back into the funnel.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Current position of a lead in the conversion funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStage {
    /// First contact. Build rapport and learn the goal.
    Connection,
    /// Current routine and history.
    Situation,
    /// The obstacle and how it feels.
    Problem,
    /// Coaching as the answer to that obstacle.
    Solution,
    /// Asking for the assessment slot.
    Closing,
    /// Assessment booked. Terminal.
    Booked,
    /// Price, time or commitment pushback.
    Objection,
    /// Lead went quiet and is being re-engaged.
    GhostRecovery,
}

/// Identifiers written by earlier versions of the conversation store.
///
/// Matched after lowercasing and trimming. Every entry is reviewed: the
/// numbered ids come from the fulfillment webhook, the rest from the strategy
/// and message-count phase vocabularies.
pub const LEGACY_STAGE_IDS: &[(&str, DialogueStage)] = &[
    ("1_connection", DialogueStage::Connection),
    ("2_situation", DialogueStage::Situation),
    ("3_problem", DialogueStage::Problem),
    ("4_solution", DialogueStage::Solution),
    ("5_closing", DialogueStage::Closing),
    ("6_booked", DialogueStage::Booked),
    ("discovery", DialogueStage::Connection),
    ("hook", DialogueStage::Connection),
    ("qualification", DialogueStage::Situation),
    ("diagnosis", DialogueStage::Situation),
    ("bridge", DialogueStage::Problem),
    ("pain", DialogueStage::Problem),
    ("reframe", DialogueStage::Problem),
    ("select", DialogueStage::Solution),
    ("pitch", DialogueStage::Solution),
    ("presentation", DialogueStage::Solution),
    ("close", DialogueStage::Closing),
    ("post_close", DialogueStage::Booked),
    ("objection_handling", DialogueStage::Objection),
    ("ghost", DialogueStage::GhostRecovery),
    ("re_engage", DialogueStage::GhostRecovery),
    ("followup", DialogueStage::GhostRecovery),
];

impl DialogueStage {
    /// All stages, forward progression first.
    pub const ALL: [DialogueStage; 8] = [
        Self::Connection,
        Self::Situation,
        Self::Problem,
        Self::Solution,
        Self::Closing,
        Self::Booked,
        Self::Objection,
        Self::GhostRecovery,
    ];

    /// Canonical identifier, identical to the serde form.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Situation => "situation",
            Self::Problem => "problem",
            Self::Solution => "solution",
            Self::Closing => "closing",
            Self::Booked => "booked",
            Self::Objection => "objection",
            Self::GhostRecovery => "ghost_recovery",
        }
    }

    /// Returns a short label, suitable for logs and the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connection => "Connection",
            Self::Situation => "Situation",
            Self::Problem => "Problem",
            Self::Solution => "Solution",
            Self::Closing => "Closing",
            Self::Booked => "Booked",
            Self::Objection => "Objection",
            Self::GhostRecovery => "Ghost Recovery",
        }
    }

    /// Parses a canonical or legacy stage identifier.
    pub fn from_id(raw: &str) -> Option<Self> {
        let id = raw.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.id() == id)
            .or_else(|| {
                LEGACY_STAGE_IDS
                    .iter()
                    .find(|(legacy, _)| *legacy == id)
                    .map(|(_, stage)| *stage)
            })
    }

    /// True for Objection and GhostRecovery.
    pub fn is_cross_cutting(&self) -> bool {
        matches!(self, Self::Objection | Self::GhostRecovery)
    }

    /// Position in the forward progression; `None` for cross-cutting stages.
    pub fn funnel_position(&self) -> Option<usize> {
        match self {
            Self::Connection => Some(0),
            Self::Situation => Some(1),
            Self::Problem => Some(2),
            Self::Solution => Some(3),
            Self::Closing => Some(4),
            Self::Booked => Some(5),
            Self::Objection | Self::GhostRecovery => None,
        }
    }

    fn forward_successor(&self) -> Option<Self> {
        match self {
            Self::Connection => Some(Self::Situation),
            Self::Situation => Some(Self::Problem),
            Self::Problem => Some(Self::Solution),
            Self::Solution => Some(Self::Closing),
            Self::Closing => Some(Self::Booked),
            Self::Booked => None,
            Self::Objection => Some(Self::Solution),
            Self::GhostRecovery => Some(Self::Situation),
        }
    }
}

impl Default for DialogueStage {
    fn default() -> Self {
        Self::Connection
    }
}

impl std::fmt::Display for DialogueStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl StateMachine for DialogueStage {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        if *self == Self::Booked {
            return vec![];
        }
        let mut targets: Vec<Self> = self.forward_successor().into_iter().collect();
        for cross in [Self::Objection, Self::GhostRecovery] {
            if cross != *self && !targets.contains(&cross) {
                targets.push(cross);
            }
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod identifiers {
        use super::*;

        #[test]
        fn default_stage_is_connection() {
            assert_eq!(DialogueStage::default(), DialogueStage::Connection);
        }

        #[test]
        fn id_matches_serde_form() {
            for stage in DialogueStage::ALL {
                let json = serde_json::to_string(&stage).unwrap();
                assert_eq!(json, format!("\"{}\"", stage.id()));
            }
        }

        #[test]
        fn parses_canonical_ids_case_insensitively() {
            assert_eq!(DialogueStage::from_id(" Closing "), Some(DialogueStage::Closing));
            assert_eq!(
                DialogueStage::from_id("GHOST_RECOVERY"),
                Some(DialogueStage::GhostRecovery)
            );
        }

        #[test]
        fn parses_legacy_ids() {
            assert_eq!(DialogueStage::from_id("1_CONNECTION"), Some(DialogueStage::Connection));
            assert_eq!(DialogueStage::from_id("Discovery"), Some(DialogueStage::Connection));
            assert_eq!(DialogueStage::from_id("post_close"), Some(DialogueStage::Booked));
            assert_eq!(DialogueStage::from_id("re_engage"), Some(DialogueStage::GhostRecovery));
        }

        #[test]
        fn unknown_ids_are_none() {
            assert_eq!(DialogueStage::from_id("7_UPSELL"), None);
            assert_eq!(DialogueStage::from_id(""), None);
        }

        #[test]
        fn legacy_ids_do_not_shadow_canonical_ids() {
            for (legacy, _) in LEGACY_STAGE_IDS {
                assert!(DialogueStage::ALL.iter().all(|s| s.id() != *legacy));
            }
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn forward_progression_is_valid() {
            use DialogueStage::*;
            for (from, to) in [
                (Connection, Situation),
                (Situation, Problem),
                (Problem, Solution),
                (Solution, Closing),
                (Closing, Booked),
            ] {
                assert!(from.can_transition_to(&to), "{from} -> {to}");
            }
        }

        #[test]
        fn backward_moves_are_invalid() {
            assert!(!DialogueStage::Problem.can_transition_to(&DialogueStage::Situation));
            assert!(DialogueStage::Closing
                .transition_to(DialogueStage::Connection)
                .is_err());
        }

        #[test]
        fn cross_cutting_reachable_from_every_non_terminal_stage() {
            for stage in DialogueStage::ALL.into_iter().filter(|s| !s.is_terminal()) {
                for cross in [DialogueStage::Objection, DialogueStage::GhostRecovery] {
                    if stage != cross {
                        assert!(stage.can_transition_to(&cross), "{stage} -> {cross}");
                    }
                }
            }
        }

        #[test]
        fn cross_cutting_stages_resolve_into_funnel() {
            assert!(DialogueStage::Objection.can_transition_to(&DialogueStage::Solution));
            assert!(DialogueStage::GhostRecovery.can_transition_to(&DialogueStage::Situation));
        }

        #[test]
        fn booked_is_only_terminal_stage() {
            let terminal: Vec<_> = DialogueStage::ALL.into_iter().filter(|s| s.is_terminal()).collect();
            assert_eq!(terminal, vec![DialogueStage::Booked]);
        }
    }
}
