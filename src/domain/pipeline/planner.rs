//! Turn planner.
//!
//! Composes the domain components for one inbound message: leak probe and
//! risk triage first, then inactivity, stage tracking and objection
//! detection, then strategy, score and prompt. Pure; the caller performs
//! the generation call and persists the returned stage.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::domain::dialogue::{
    ConversationTurn, DialogueStage, LeadScore, LeadScorer, LeadSignals, Sentiment,
    SentimentTriage, StageTracker, StageTransition, StrategyDirective, StrategySelector,
};
use crate::domain::foundation::{first_match, StateMachine};
use crate::domain::lead::{LeadProfile, PersonaClassifier, PersonaVariant, RegionCatalogue};
use crate::domain::prompt::{AssembledPrompt, PromptAssembler, PromptInputs, WorldContext};
use crate::domain::safety::{LeakVerdict, OutputSafetyFilter, SafeReply};

/// Phrases that move an active lead into Objection.
pub const OBJECTION_KEYWORDS: &[&str] = &[
    "too expensive",
    "expensive",
    "think about it",
    "not sure",
    "can't afford",
    "no time",
];

/// Sent instead of a generated reply when a probe is short-circuited.
pub const DEFAULT_DEFLECTION_REPLY: &str =
    "Haha I'm just here to help you get results with your training! What's the main thing you'd like to work on?";

/// Days of silence after which the lead is treated as ghosted.
pub const DEFAULT_GHOST_THRESHOLD_DAYS: f64 = 3.0;

/// What to do when an inbound message probes for internals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakPolicy {
    /// Reply with the fixed deflection message, no generation.
    #[default]
    ShortCircuit,
    /// Generate with the deflection directive and a security notice.
    Annotate,
}

/// Planner settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    pub ghost_threshold_days: f64,
    pub leak_policy: LeakPolicy,
    pub deflection_reply: String,
    pub open_hour: u32,
    pub close_hour: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            ghost_threshold_days: DEFAULT_GHOST_THRESHOLD_DAYS,
            leak_policy: LeakPolicy::default(),
            deflection_reply: DEFAULT_DEFLECTION_REPLY.to_string(),
            open_hour: 8,
            close_hour: 21,
        }
    }
}

/// One inbound message and the caller-held state around it.
#[derive(Debug, Clone)]
pub struct TurnInput<'a> {
    pub profile: &'a LeadProfile,
    /// Stored stage identifier, canonical or legacy.
    pub current_stage: &'a str,
    pub message: &'a str,
    pub history: &'a [ConversationTurn],
    pub message_count: u32,
    pub days_inactive: f64,
    /// Local time in the business time zone, when known.
    pub now: Option<DateTime<FixedOffset>>,
}

/// What the caller does next.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnAction {
    /// Send this reply as-is.
    Deflect { reply: SafeReply },
    /// Call the generator with this system prompt.
    Generate { prompt: AssembledPrompt },
}

/// Everything decided for one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnPlan {
    pub stage: DialogueStage,
    pub has_changed: bool,
    pub stage_goal: String,
    pub persona: PersonaVariant,
    pub region: String,
    pub sentiment: Sentiment,
    pub leak: LeakVerdict,
    pub lead_score: LeadScore,
    pub strategy: StrategyDirective,
    pub action: TurnAction,
}

impl TurnPlan {
    pub fn prompt(&self) -> Option<&AssembledPrompt> {
        match &self.action {
            TurnAction::Generate { prompt } => Some(prompt),
            TurnAction::Deflect { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Deflect,
    DeEscalate,
    Funnel,
}

/// Plans a turn from pure domain components.
#[derive(Debug, Clone)]
pub struct TurnPlanner {
    classifier: PersonaClassifier,
    regions: Arc<RegionCatalogue>,
    tracker: StageTracker,
    selector: StrategySelector,
    triage: SentimentTriage,
    scorer: LeadScorer,
    assembler: PromptAssembler,
    filter: Arc<OutputSafetyFilter>,
    settings: PlannerSettings,
}

impl Default for TurnPlanner {
    fn default() -> Self {
        Self::new(
            Arc::new(RegionCatalogue::default()),
            PromptAssembler::default(),
            Arc::new(OutputSafetyFilter::default()),
            PlannerSettings::default(),
        )
    }
}

impl TurnPlanner {
    pub fn new(
        regions: Arc<RegionCatalogue>,
        assembler: PromptAssembler,
        filter: Arc<OutputSafetyFilter>,
        settings: PlannerSettings,
    ) -> Self {
        Self {
            classifier: PersonaClassifier::new(),
            regions,
            tracker: StageTracker::new(),
            selector: StrategySelector::new(),
            triage: SentimentTriage::new(),
            scorer: LeadScorer::new(),
            assembler,
            filter,
            settings,
        }
    }

    pub fn filter(&self) -> &OutputSafetyFilter {
        &self.filter
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn plan(&self, input: &TurnInput<'_>) -> TurnPlan {
        let profile = input.profile;
        let persona = self.classifier.classify(profile);
        let region = self.regions.resolve(profile.area());

        let leak = self.filter.detect_leak(input.message);
        let sentiment = self.triage.analyze(input.message);

        let route = if leak.has_leak {
            Route::Deflect
        } else if sentiment == Sentiment::Risk {
            Route::DeEscalate
        } else {
            Route::Funnel
        };

        let transition = match route {
            Route::Deflect | Route::DeEscalate => self.hold(input.current_stage),
            Route::Funnel => self.advance(input),
        };
        let stage = transition.stage;

        let strategy = match route {
            Route::Deflect => self.selector.deflection(profile),
            Route::DeEscalate => self.selector.de_escalation(profile),
            Route::Funnel => self.selector.for_stage(stage, profile),
        };

        let has_pain = stage == DialogueStage::Objection
            || stage
                .funnel_position()
                .zip(DialogueStage::Problem.funnel_position())
                .map_or(false, |(at, problem)| at >= problem);
        let signals = LeadSignals::from_turn(
            profile,
            input.message,
            input.message_count,
            input.days_inactive,
            has_pain,
        );
        let lead_score = self.scorer.score(&signals);

        let action = if route == Route::Deflect && self.settings.leak_policy == LeakPolicy::ShortCircuit
        {
            tracing::info!(confidence = leak.confidence, "leak probe short-circuited");
            TurnAction::Deflect {
                reply: self.filter.deliver(&self.settings.deflection_reply).reply,
            }
        } else {
            let world = input
                .now
                .map(|now| WorldContext::new(now, self.settings.open_hour, self.settings.close_hour));
            let prompt = self.assembler.assemble(&PromptInputs {
                persona,
                region,
                strategy: &strategy,
                stage,
                stage_goal: &transition.prompt_goal,
                profile,
                lead_score,
                history: input.history,
                world,
                security_notice: route == Route::Deflect,
            });
            TurnAction::Generate { prompt }
        };

        tracing::debug!(
            stage = %stage,
            has_changed = transition.has_changed,
            persona = %persona,
            score = lead_score.value(),
            "turn planned"
        );

        TurnPlan {
            stage,
            has_changed: transition.has_changed,
            stage_goal: transition.prompt_goal,
            persona,
            region: region.area_label.clone(),
            sentiment,
            leak,
            lead_score,
            strategy,
            action,
        }
    }

    /// Keeps the stored stage, repairing an unrecognised identifier.
    fn hold(&self, current: &str) -> StageTransition {
        match DialogueStage::from_id(current) {
            Some(stage) => self.transition(stage, false),
            None => self.tracker.track(current, ""),
        }
    }

    fn advance(&self, input: &TurnInput<'_>) -> StageTransition {
        if let Some(current) = DialogueStage::from_id(input.current_stage) {
            if input.days_inactive > self.settings.ghost_threshold_days
                && !current.is_terminal()
                && current != DialogueStage::GhostRecovery
            {
                tracing::info!(
                    from = %current,
                    days_inactive = input.days_inactive,
                    "lead went quiet, entering ghost recovery"
                );
                return self.transition(DialogueStage::GhostRecovery, true);
            }

            // Closing goes terminal on the booking shortcut, so a stated
            // objection has to win before the tracker runs.
            if current == DialogueStage::Closing {
                if let Some(keyword) = first_match(input.message, OBJECTION_KEYWORDS) {
                    tracing::info!(from = %current, keyword, "objection raised while closing");
                    return self.transition(DialogueStage::Objection, true);
                }
            }
        }

        let transition = self.tracker.track(input.current_stage, input.message);
        let stage = transition.stage;
        if !transition.has_changed && !stage.is_terminal() && !stage.is_cross_cutting() {
            if let Some(keyword) = first_match(input.message, OBJECTION_KEYWORDS) {
                tracing::info!(from = %stage, keyword, "objection raised");
                return self.transition(DialogueStage::Objection, true);
            }
        }
        transition
    }

    fn transition(&self, stage: DialogueStage, has_changed: bool) -> StageTransition {
        StageTransition {
            stage,
            has_changed,
            prompt_goal: self.tracker.goal(stage).to_string(),
        }
    }
}
