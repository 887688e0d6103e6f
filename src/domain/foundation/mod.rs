//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, keyword matching helpers, the state machine trait
//! and error types that form the vocabulary of the sales pipeline domain.

mod errors;
mod ids;
mod keywords;
mod lenient;
mod state_machine;

pub use errors::ValidationError;
pub use ids::LeadId;
pub use keywords::{contains_any, first_match};
pub use lenient::lenient_u32;
pub use state_machine::StateMachine;
