//! Turn handlers - one inbound lead message at a time.

mod inbound_message;

pub use inbound_message::{
    InboundMessageCommand, InboundMessageConfig, InboundMessageHandler, TurnError, TurnOutcome,
};
