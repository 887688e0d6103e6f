//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Text generator implementations (mock, OpenAI-compatible)
//! - `catalogue` - Lookup tables loaded from YAML

pub mod ai;
pub mod catalogue;

pub use ai::{MockTextGenerator, OpenAICompatibleConfig, OpenAICompatibleGenerator};
pub use catalogue::{Catalogue, CatalogueError};
