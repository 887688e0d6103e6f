//! Audience persona classification.
//!
//! A persona selects tone and talking points for the generated reply. The
//! classifier is an ordered decision table: the first rule whose predicate
//! holds wins, and the table always ends in a catch-all.

use serde::{Deserialize, Serialize};

use super::profile::{Gender, LeadProfile};
use crate::domain::foundation::contains_any;

/// Tag fragments that mark a lead as a parent or postpartum.
pub const PARENTAL_TAGS: &[&str] = &[
    "mom",
    "mum",
    "mother",
    "parent",
    "postpartum",
    "post-partum",
    "post_preg",
    "pregnan",
    "baby",
];

/// Audience segment used to tailor the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonaVariant {
    #[serde(rename = "MEN_40")]
    Men40,
    #[serde(rename = "MEN_50")]
    Men50,
    #[serde(rename = "WOMEN_40")]
    Women40,
    #[serde(rename = "WOMEN_50")]
    Women50,
    Moms,
    General,
}

impl PersonaVariant {
    /// Identifier used in logs and the prompt.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Men40 => "MEN_40",
            Self::Men50 => "MEN_50",
            Self::Women40 => "WOMEN_40",
            Self::Women50 => "WOMEN_50",
            Self::Moms => "MOMS",
            Self::General => "GENERAL",
        }
    }

    /// Returns the audience instruction block injected into the prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Men40 => {
                "AUDIENCE: Busy professional man in his 40s.\n\
                 - Talk about energy, stress, belly fat and keeping up with work and family.\n\
                 - Be direct and efficient. Respect his time; no fluff.\n\
                 - Frame training as a performance upgrade, not a punishment."
            }
            Self::Men50 => {
                "AUDIENCE: Man aged 50+.\n\
                 - Talk about joint health, mobility, strength and staying independent.\n\
                 - Be respectful and reassuring. Stress safe, coached progression.\n\
                 - Avoid intense bootcamp language."
            }
            Self::Women40 => {
                "AUDIENCE: Woman in her 40s.\n\
                 - Talk about metabolism, toning, confidence and feeling strong again.\n\
                 - Be warm and encouraging. Avoid body shaming or crash-diet language.\n\
                 - Highlight sustainable results that fit a busy life."
            }
            Self::Women50 => {
                "AUDIENCE: Woman aged 50+.\n\
                 - Talk about bone density, balance, hormonal changes and energy.\n\
                 - Be gentle and knowledgeable. Stress safety and feeling good daily.\n\
                 - Focus on strength for life rather than aesthetics alone."
            }
            Self::Moms => {
                "AUDIENCE: Mother, possibly postpartum.\n\
                 - Talk about getting time back for herself, core recovery and energy for the kids.\n\
                 - Be empathetic about limited time and sleep. Never guilt-trip.\n\
                 - Highlight flexible at-home sessions around the family schedule."
            }
            Self::General => {
                "AUDIENCE: General fitness lead.\n\
                 - Mirror the lead's own words about their goal.\n\
                 - Be friendly and curious. Learn what matters to them before pitching."
            }
        }
    }
}

impl Default for PersonaVariant {
    fn default() -> Self {
        Self::General
    }
}

impl std::fmt::Display for PersonaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Normalised facts the decision table reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileFacts {
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub has_dependents: bool,
    pub parental_tag: bool,
}

impl ProfileFacts {
    pub fn from_profile(profile: &LeadProfile) -> Self {
        Self {
            gender: profile.gender(),
            age: profile.age,
            has_dependents: profile.dependents.unwrap_or(0) > 0,
            parental_tag: profile.tags.iter().any(|tag| contains_any(tag, PARENTAL_TAGS)),
        }
    }

    fn is(&self, gender: Gender) -> bool {
        self.gender == Some(gender)
    }

    fn age_at_least(&self, years: u32) -> bool {
        self.age.map_or(false, |age| age >= years)
    }
}

/// One row of the persona decision table.
#[derive(Clone, Copy)]
pub struct PersonaRule {
    pub name: &'static str,
    pub predicate: fn(&ProfileFacts) -> bool,
    pub variant: PersonaVariant,
}

impl std::fmt::Debug for PersonaRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaRule")
            .field("name", &self.name)
            .field("variant", &self.variant)
            .finish()
    }
}

/// Persona rules in priority order.
pub const PERSONA_RULES: &[PersonaRule] = &[
    PersonaRule {
        name: "female_parent",
        predicate: |f| f.is(Gender::Female) && (f.has_dependents || f.parental_tag),
        variant: PersonaVariant::Moms,
    },
    PersonaRule {
        name: "male_50_plus",
        predicate: |f| f.is(Gender::Male) && f.age_at_least(50),
        variant: PersonaVariant::Men50,
    },
    PersonaRule {
        name: "male_40_plus",
        predicate: |f| f.is(Gender::Male) && f.age_at_least(40),
        variant: PersonaVariant::Men40,
    },
    PersonaRule {
        name: "female_50_plus",
        predicate: |f| f.is(Gender::Female) && f.age_at_least(50),
        variant: PersonaVariant::Women50,
    },
    PersonaRule {
        name: "female_40_plus",
        predicate: |f| f.is(Gender::Female) && f.age_at_least(40),
        variant: PersonaVariant::Women40,
    },
    PersonaRule {
        name: "fallback",
        predicate: |_| true,
        variant: PersonaVariant::General,
    },
];

/// Maps a lead profile to its audience persona.
#[derive(Debug, Clone, Copy)]
pub struct PersonaClassifier {
    rules: &'static [PersonaRule],
}

impl Default for PersonaClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaClassifier {
    pub fn new() -> Self {
        Self { rules: PERSONA_RULES }
    }

    /// Classifies a profile. Total: missing attributes fall through to `General`.
    pub fn classify(&self, profile: &LeadProfile) -> PersonaVariant {
        let facts = ProfileFacts::from_profile(profile);
        self.rules
            .iter()
            .find(|rule| (rule.predicate)(&facts))
            .map(|rule| {
                tracing::debug!(rule = rule.name, persona = %rule.variant, "persona classified");
                rule.variant
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classify(profile: &LeadProfile) -> PersonaVariant {
        PersonaClassifier::new().classify(profile)
    }

    mod decision_table {
        use super::*;

        #[test]
        fn male_52_is_men_50() {
            let profile = LeadProfile::new().with_gender("male").with_age(52);
            assert_eq!(classify(&profile), PersonaVariant::Men50);
        }

        #[test]
        fn male_45_is_men_40() {
            let profile = LeadProfile::new().with_gender("Male").with_age(45);
            assert_eq!(classify(&profile), PersonaVariant::Men40);
        }

        #[test]
        fn female_with_children_is_moms() {
            let profile = LeadProfile::new().with_gender("female").with_age(55).with_dependents(2);
            assert_eq!(classify(&profile), PersonaVariant::Moms);
        }

        #[test]
        fn female_with_postpartum_tag_is_moms() {
            let profile = LeadProfile::new().with_gender("female").with_tag("Postpartum recovery");
            assert_eq!(classify(&profile), PersonaVariant::Moms);
        }

        #[test]
        fn male_with_dependents_is_not_moms() {
            let profile = LeadProfile::new().with_gender("male").with_age(30).with_dependents(3);
            assert_eq!(classify(&profile), PersonaVariant::General);
        }

        #[test]
        fn female_bands() {
            let f = |age| LeadProfile::new().with_gender("female").with_age(age);
            assert_eq!(classify(&f(61)), PersonaVariant::Women50);
            assert_eq!(classify(&f(40)), PersonaVariant::Women40);
            assert_eq!(classify(&f(39)), PersonaVariant::General);
        }

        #[test]
        fn missing_attributes_fall_through_to_general() {
            assert_eq!(classify(&LeadProfile::new()), PersonaVariant::General);
            assert_eq!(classify(&LeadProfile::new().with_age(70)), PersonaVariant::General);
        }

        #[test]
        fn table_ends_in_catch_all() {
            let last = PERSONA_RULES.last().unwrap();
            let empty = ProfileFacts::from_profile(&LeadProfile::new());
            assert!((last.predicate)(&empty));
        }
    }

    mod variants {
        use super::*;

        #[test]
        fn serializes_with_legacy_ids() {
            assert_eq!(serde_json::to_string(&PersonaVariant::Men50).unwrap(), "\"MEN_50\"");
            assert_eq!(serde_json::to_string(&PersonaVariant::Moms).unwrap(), "\"MOMS\"");
        }

        #[test]
        fn every_variant_has_instruction() {
            for rule in PERSONA_RULES {
                assert!(rule.variant.instruction().starts_with("AUDIENCE:"));
            }
        }
    }

    fn gender_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("male"), Just("female")]
    }

    proptest! {
        #[test]
        fn female_parent_is_always_moms(age in proptest::option::of(0u32..100), deps in 1u32..6) {
            let mut profile = LeadProfile::new().with_gender("female").with_dependents(deps);
            profile.age = age;
            prop_assert_eq!(classify(&profile), PersonaVariant::Moms);
        }

        #[test]
        fn age_bands_hold(gender in gender_strategy(), age in 0u32..100) {
            let profile = LeadProfile::new().with_gender(gender).with_age(age);
            let expected = match (gender, age) {
                ("male", a) if a >= 50 => PersonaVariant::Men50,
                ("male", a) if a >= 40 => PersonaVariant::Men40,
                ("female", a) if a >= 50 => PersonaVariant::Women50,
                ("female", a) if a >= 40 => PersonaVariant::Women40,
                _ => PersonaVariant::General,
            };
            prop_assert_eq!(classify(&profile), expected);
        }

        #[test]
        fn classification_is_idempotent(gender in ".{0,8}", age in proptest::option::of(0u32..120), tag in ".{0,12}") {
            let mut profile = LeadProfile::new().with_gender(gender).with_tag(tag);
            profile.age = age;
            prop_assert_eq!(classify(&profile), classify(&profile));
        }
    }
}
