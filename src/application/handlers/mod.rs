//! Application handlers.
//!
//! Command handlers that orchestrate domain operations and ports.

pub mod turn;

pub use turn::{
    InboundMessageCommand, InboundMessageConfig, InboundMessageHandler, TurnError, TurnOutcome,
};
