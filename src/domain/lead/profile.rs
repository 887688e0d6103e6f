//! Lead profile as read from the external contact store.
//!
//! The contact store is loosely typed: ages arrive as numbers, numeric
//! strings or garbage. Deserialization is lenient so that a malformed field
//! degrades to `None` instead of rejecting the whole record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::lenient_u32;

/// Read-only identity and context attributes of a lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadProfile {
    /// Display name, usually the first name only.
    pub name: Option<String>,
    /// Free-text gender as stored by the contact store.
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub dependents: Option<u32>,
    pub tags: Vec<String>,
    /// Free-text area or neighbourhood.
    pub locality: Option<String>,
    /// Stated fitness goal.
    pub goal: Option<String>,
}

/// Normalised gender used by the persona decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parses the contact store's free-text gender. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "male" | "m" | "man" => Some(Self::Male),
            "female" | "f" | "woman" => Some(Self::Female),
            _ => None,
        }
    }
}

impl LeadProfile {
    /// Creates an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_dependents(mut self, dependents: u32) -> Self {
        self.dependents = Some(dependents);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = Some(locality.into());
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    /// Returns the normalised gender, if recognisable.
    pub fn gender(&self) -> Option<Gender> {
        self.gender.as_deref().and_then(Gender::parse)
    }

    /// Name for display, or `None` when blank.
    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// Goal for display, or `None` when blank.
    pub fn stated_goal(&self) -> Option<&str> {
        non_blank(self.goal.as_deref())
    }

    /// Locality for display, or `None` when blank.
    pub fn area(&self) -> Option<&str> {
        non_blank(self.locality.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
