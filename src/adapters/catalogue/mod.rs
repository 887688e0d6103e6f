//! Catalogue Adapters.
//!
//! - `Catalogue` - Built-in lookup tables, optionally extended from a YAML file

mod yaml_catalogue;

pub use yaml_catalogue::{Catalogue, CatalogueError, CatalogueFile};
