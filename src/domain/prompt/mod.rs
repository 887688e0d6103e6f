//! Prompt module - composes the instruction text for the generator.

mod assembler;
mod policy;
mod script;

pub use assembler::{AssembledPrompt, PromptAssembler, PromptInputs, WorldContext, HISTORY_WINDOW};
pub use policy::{ConstitutionalPolicy, Principle, POLICY_HEADER};
pub use script::{PersonaScript, REPLY_END, REPLY_START, THOUGHT_END, THOUGHT_START};
