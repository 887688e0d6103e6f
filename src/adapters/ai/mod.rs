//! Text Generator Adapters.
//!
//! ## Available Adapters
//!
//! - `MockTextGenerator` - Configurable mock for testing
//! - `OpenAICompatibleGenerator` - Any chat completions compatible backend

mod mock_generator;
mod openai_compatible;

pub use mock_generator::{MockResponse, MockTextGenerator};
pub use openai_compatible::{
    OpenAICompatibleConfig, OpenAICompatibleGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
