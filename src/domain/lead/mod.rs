//! Lead module - who the lead is and where they live.
//!
//! Pure classification of the read-only lead profile into an audience
//! persona and a regional context.

mod persona;
mod profile;
mod region;

pub use persona::{
    PersonaClassifier, PersonaRule, PersonaVariant, ProfileFacts, PARENTAL_TAGS, PERSONA_RULES,
};
pub use profile::{Gender, LeadProfile};
pub use region::{RegionCatalogue, RegionEntry, RegionalContext};
