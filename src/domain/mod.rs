//! Domain layer containing the sales dialogue rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, errors, keyword matching, state machine)
//! - `lead` - Lead profile, persona classification and regional context
//! - `dialogue` - Funnel stages, tracking, strategy, sentiment and scoring
//! - `prompt` - Persona script, constitutional policy and prompt assembly
//! - `safety` - Leak probes, sanitization, channel formatting and delivery
//! - `pipeline` - Turn planning across all of the above

pub mod dialogue;
pub mod foundation;
pub mod lead;
pub mod pipeline;
pub mod prompt;
pub mod safety;
