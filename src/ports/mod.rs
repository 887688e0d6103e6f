//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TextGenerator` - Port for the external reply generator

mod text_generator;

pub use text_generator::{
    ChatMessage, ChatRole, GenerationError, GenerationRequest, GenerationResponse, TextGenerator,
};
