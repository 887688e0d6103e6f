//! Regional context lookup.
//!
//! Maps a free-text locality to talking points about the area. The catalogue
//! is an ordered list of keyword sets; the first entry with a matching
//! keyword wins, so more specific areas must be listed before broader ones
//! ("jumeirah lake" before "jumeirah").

use serde::{Deserialize, Serialize};

use crate::domain::foundation::first_match;

/// Contextual talking points for one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalContext {
    pub area_label: String,
    pub characterization: String,
    pub contact_windows: String,
    pub phrasing: String,
}

impl RegionalContext {
    /// Renders the context as a prompt block.
    pub fn to_prompt_block(&self) -> String {
        format!(
            "LOCAL CONTEXT ({}):\n- Area: {}\n- Best contact times: {}\n- Local phrasing: {}",
            self.area_label, self.characterization, self.contact_windows, self.phrasing
        )
    }
}

/// One catalogue row: any keyword selects the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub keywords: Vec<String>,
    pub context: RegionalContext,
}

/// Ordered regional catalogue with a generic fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCatalogue {
    pub entries: Vec<RegionEntry>,
    pub fallback: RegionalContext,
}

fn context(label: &str, characterization: &str, windows: &str, phrasing: &str) -> RegionalContext {
    RegionalContext {
        area_label: label.to_string(),
        characterization: characterization.to_string(),
        contact_windows: windows.to_string(),
        phrasing: phrasing.to_string(),
    }
}

fn entry(keywords: &[&str], context: RegionalContext) -> RegionEntry {
    RegionEntry {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        context,
    }
}

impl Default for RegionCatalogue {
    fn default() -> Self {
        Self {
            entries: vec![
                entry(
                    &["marina", "jlt", "jbr", "jumeirah lake"],
                    context(
                        "Dubai Marina / JLT / JBR",
                        "High-rise apartments, young professionals, building gyms that are often crowded.",
                        "7-9am before work or 7-9pm after work.",
                        "Mention training in the building gym or along the Marina walk.",
                    ),
                ),
                entry(
                    &["downtown", "business bay", "difc"],
                    context(
                        "Downtown / Business Bay / DIFC",
                        "Corporate crowd with long office hours and little spare time.",
                        "Early mornings 6-8am or lunch breaks.",
                        "Frame sessions as efficient and fitting around meetings.",
                    ),
                ),
                entry(
                    &["jumeirah", "umm suqeim", "al wasl"],
                    context(
                        "Jumeirah / Umm Suqeim",
                        "Villas and established families close to the beach.",
                        "Mid-morning 9-11am after school drop-off.",
                        "Mention home sessions in the villa or garden and beach workouts.",
                    ),
                ),
                entry(
                    &["arabian ranches", "dubai hills", "springs", "meadows", "lakes"],
                    context(
                        "Arabian Ranches / Dubai Hills / Springs",
                        "Family communities with villas and community parks.",
                        "Mornings 8-10am or early evening 5-7pm.",
                        "Mention community parks and coaching at home so there is no drive.",
                    ),
                ),
                entry(
                    &["abu dhabi", "yas", "saadiyat", "reem"],
                    context(
                        "Abu Dhabi",
                        "Capital residents, government and corporate schedules.",
                        "After 4pm on weekdays or weekend mornings.",
                        "Confirm we cover Abu Dhabi with local coaches.",
                    ),
                ),
                entry(
                    &["sharjah", "ajman"],
                    context(
                        "Sharjah / Ajman",
                        "Commuters with long drives into Dubai.",
                        "Evenings after 7pm once they are home.",
                        "Acknowledge the commute and offer sessions close to home.",
                    ),
                ),
            ],
            fallback: context(
                "General UAE",
                "Busy UAE resident.",
                "Late morning or early evening.",
                "Keep it local and friendly; coaching comes to them at home or nearby.",
            ),
        }
    }
}

impl RegionCatalogue {
    /// Resolves a locality. Total: blank or unmatched input returns the fallback.
    pub fn resolve(&self, locality: Option<&str>) -> &RegionalContext {
        let Some(locality) = locality.filter(|l| !l.trim().is_empty()) else {
            return &self.fallback;
        };
        self.entries
            .iter()
            .find_map(|entry| {
                first_match(locality, entry.keywords.as_slice()).map(|keyword| {
                    tracing::debug!(keyword, area = %entry.context.area_label, "region resolved");
                    &entry.context
                })
            })
            .unwrap_or(&self.fallback)
    }
}
