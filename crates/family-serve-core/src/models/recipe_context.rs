// ABOUTME: Versioned recipe context payload produced by the group aggregator
// ABOUTME: De-identified member entries, segments, allergies, restrictions and content hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::recipe_context::{CONTEXT_TYPE, SCHEMA_VERSION};

/// Age band of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    /// Younger than 13
    Child,
    /// 13 to 17
    Teen,
    /// 18 to 59
    Adult,
    /// 60 and older
    Senior,
}

impl AgeGroup {
    /// Classify an age in years
    #[must_use]
    pub const fn from_age(age: u32) -> Self {
        match age {
            0..=12 => Self::Child,
            13..=17 => Self::Teen,
            18..=59 => Self::Adult,
            _ => Self::Senior,
        }
    }

    /// Lowercase label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Teen => "teen",
            Self::Adult => "adult",
            Self::Senior => "senior",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated recipe context of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeContext {
    /// Always `group-recipe-context`
    #[serde(rename = "type")]
    pub context_type: String,
    /// Payload schema version
    pub schema_version: u32,
    /// Group identity and size
    pub group: GroupDescriptor,
    /// One entry per member, in input order
    pub members: Vec<MemberContext>,
    /// Population segments
    pub segments: Segments,
    /// Allergies by descending member count
    pub allergies: Vec<AllergyAggregate>,
    /// Sorted, deduplicated hard restriction reasons
    pub hard_restrictions: Vec<String>,
    /// Sorted, deduplicated soft restriction reasons
    pub soft_restrictions: Vec<String>,
    /// Liked cuisines and dislikes, absent when both are empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_preferences: Option<SoftPreferences>,
    /// Distribution statistics
    pub stats: ContextStats,
    /// `sha256:` followed by 16 hex characters
    pub hash: String,
}

impl RecipeContext {
    /// Empty context for a group, hash not yet computed
    #[must_use]
    pub fn unhashed(group: GroupDescriptor) -> Self {
        Self {
            context_type: CONTEXT_TYPE.to_owned(),
            schema_version: SCHEMA_VERSION,
            group,
            members: Vec::new(),
            segments: Segments::default(),
            allergies: Vec::new(),
            hard_restrictions: Vec::new(),
            soft_restrictions: Vec::new(),
            soft_preferences: None,
            stats: ContextStats::default(),
            hash: String::new(),
        }
    }
}

/// Group identity inside a context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDescriptor {
    /// Group id
    pub id: String,
    /// Group name
    pub name: String,
    /// Number of members
    pub size: usize,
}

/// Member entry; anonymized entries carry an alias instead of names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberContext {
    /// Member id
    pub id: String,
    /// Positional alias (`M1`, `M2`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Given name, raw contexts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name, raw contexts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Age band, absent when age is unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
}

/// Population segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segments {
    /// Member count per age band
    pub age_groups: BTreeMap<AgeGroup, usize>,
}

/// Members sharing one canonical allergen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyAggregate {
    /// Canonical substance
    pub substance: String,
    /// Ids of affected members, in input order
    pub members: Vec<String>,
    /// Number of affected members
    pub count: usize,
}

/// Soft preferences of the group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftPreferences {
    /// Sorted liked cuisines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisines_liked: Option<Vec<String>>,
    /// Sorted dislikes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dislikes: Option<Vec<String>>,
}

/// Distribution statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextStats {
    /// Member count per cooking skill label
    pub cooking_skill_spread: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_band_boundaries() {
        assert_eq!(AgeGroup::from_age(0), AgeGroup::Child);
        assert_eq!(AgeGroup::from_age(12), AgeGroup::Child);
        assert_eq!(AgeGroup::from_age(13), AgeGroup::Teen);
        assert_eq!(AgeGroup::from_age(17), AgeGroup::Teen);
        assert_eq!(AgeGroup::from_age(18), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(59), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(60), AgeGroup::Senior);
    }
}
