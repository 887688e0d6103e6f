//! YAML catalogue loader.
//!
//! The region table, sanitization rules and leak probes are data. A YAML
//! file can replace the region table and append rules and probes to the
//! built-in sets; every pattern is compiled at load time.
//!
//! ```yaml
//! regions:
//!   entries:
//!     - keywords: [mirdif]
//!       context: { area_label: Mirdif, characterization: .., contact_windows: .., phrasing: .. }
//!   fallback: { area_label: General UAE, .. }
//! sanitizer_rules:
//!   - { name: coach_term, pattern: "(?i)personal trainer", replacement: coach }
//! leak_probes:
//!   - "(?i)which model are you"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::lead::RegionCatalogue;
use crate::domain::safety::{LeakDetector, PatternError, SanitizationRule, Sanitizer};

/// Errors raised while loading a catalogue file.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Failed to read catalogue {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalogue YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// On-disk catalogue layout. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogueFile {
    /// Replaces the built-in region table.
    pub regions: Option<RegionCatalogue>,
    /// Appended after the built-in sanitization rules.
    pub sanitizer_rules: Vec<SanitizationRule>,
    /// Appended to the built-in leak probes.
    pub leak_probes: Vec<String>,
}

/// Compiled lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    pub regions: RegionCatalogue,
    pub sanitizer: Sanitizer,
    pub leak_detector: LeakDetector,
}

impl Catalogue {
    /// The built-in tables.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Loads and compiles a catalogue file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalogue = Self::from_yaml_str(&raw)?;
        tracing::info!(path = %path.display(), "catalogue loaded");
        Ok(catalogue)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogueError> {
        let file: CatalogueFile = if raw.trim().is_empty() {
            CatalogueFile::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        Self::from_file(file)
    }

    pub fn from_file(file: CatalogueFile) -> Result<Self, CatalogueError> {
        let regions = file.regions.unwrap_or_default();
        let sanitizer = Sanitizer::default().with_additional_rules(&file.sanitizer_rules)?;
        let leak_detector = LeakDetector::default().with_additional_probes(&file.leak_probes)?;
        tracing::debug!(
            regions = regions.entries.len(),
            extra_rules = file.sanitizer_rules.len(),
            extra_probes = file.leak_probes.len(),
            "catalogue compiled"
        );
        Ok(Self {
            regions,
            sanitizer,
            leak_detector,
        })
    }
}
