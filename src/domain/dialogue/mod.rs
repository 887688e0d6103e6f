//! Dialogue module - where the lead is in the funnel and what to do next.
//!
//! # Module Organization
//!
//! - `history` - Recent turns supplied by the caller
//! - `stage` - Funnel stages and the legacy identifier mapping
//! - `tracker` - Keyword-driven stage transitions
//! - `strategy` - Next-move directives per stage
//! - `sentiment` - Risk / positive triage of inbound text
//! - `scoring` - Rule-based lead score

mod history;
mod scoring;
mod sentiment;
mod stage;
mod strategy;
mod tracker;

pub use history::{recent, ConversationTurn, Speaker};
pub use scoring::{LeadScore, LeadScorer, LeadSignals};
pub use sentiment::{Sentiment, SentimentTriage};
pub use stage::{DialogueStage, LEGACY_STAGE_IDS};
pub use strategy::{
    interpolate, StrategyDirective, StrategySelector, StrategyTemplate, DEFAULT_GOAL,
    DEFAULT_LOCALITY, DEFAULT_NAME,
};
pub use tracker::{StageRule, StageShortcut, StageTracker, StageTransition, STAGE_RULES};
