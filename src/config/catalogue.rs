//! Catalogue override configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ConfigValidationError;

/// Optional YAML file extending the built-in lookup tables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueConfig {
    pub path: Option<PathBuf>,
}

impl CatalogueConfig {
    /// Validate catalogue configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(ConfigValidationError::MissingRequired("CATALOGUE__PATH"));
        }
        Ok(())
    }
}
