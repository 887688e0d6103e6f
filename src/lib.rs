//! Lead Pilot - Rule-based dialogue controller for fitness-coaching sales
//!
//! For every inbound lead message this crate decides which audience persona
//! applies, where the lead is in the conversion funnel, which strategic move
//! to make next and what instruction the reply generator receives. Generated
//! replies are scrubbed and formatted for the messaging channel before they
//! can be sent.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
