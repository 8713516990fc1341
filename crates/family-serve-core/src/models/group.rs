// ABOUTME: Group and member input models read by the recipe context aggregator
// ABOUTME: Tolerant deserialization of allergy, restriction and preference entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field decoders that degrade malformed values instead of rejecting the group.
///
/// `null` lists become empty, non-string list items are dropped and labels of
/// the wrong type read as absent.
mod tolerant {
    use serde::de::{DeserializeOwned, Error};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Array(items) = Value::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect())
    }

    pub(super) fn entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Array(items) = Value::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect()
    }

    pub(super) fn label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => Some(text),
            _ => None,
        })
    }

    pub(super) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(label(deserializer)?.unwrap_or_default())
    }

    pub(super) fn age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Value::deserialize(deserializer)?
            .as_u64()
            .and_then(|years| u32::try_from(years).ok()))
    }

    pub(super) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Value::deserialize(deserializer)?.as_f64())
    }
}

/// A family or household with its members.
///
/// Member order defines alias numbering in anonymized contexts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    /// Group identifier
    pub id: String,
    /// Display name of the group
    #[serde(default, deserialize_with = "tolerant::text")]
    pub name: String,
    /// Members in insertion order
    #[serde(default, deserialize_with = "tolerant::entries")]
    pub members: Vec<MemberInput>,
}

/// Snapshot of one group member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    /// Member identifier, unique within the group
    pub id: String,
    /// Role within the group (`ADMIN`, `MEMBER`)
    #[serde(
        default,
        deserialize_with = "tolerant::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    /// Given name
    #[serde(
        default,
        deserialize_with = "tolerant::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_name: Option<String>,
    /// Family name
    #[serde(
        default,
        deserialize_with = "tolerant::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_name: Option<String>,
    /// Age in years
    #[serde(
        default,
        deserialize_with = "tolerant::age",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<u32>,
    /// Gender label
    #[serde(
        default,
        deserialize_with = "tolerant::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<String>,
    /// Body weight in kilograms
    #[serde(
        default,
        deserialize_with = "tolerant::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight_kg: Option<f64>,
    /// Height in centimeters
    #[serde(
        default,
        deserialize_with = "tolerant::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub height_cm: Option<f64>,
    /// Activity level label
    #[serde(
        default,
        deserialize_with = "tolerant::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_level: Option<String>,
    /// Declared health goals
    #[serde(
        default,
        deserialize_with = "tolerant::strings",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub health_goals: Vec<String>,
    /// Free-form nutrition targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_targets: Option<Value>,
    /// Dietary preferences, allergies and restrictions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_profile: Option<DietaryProfile>,
    /// Liked cuisines
    #[serde(
        default,
        deserialize_with = "tolerant::strings",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cuisine_preferences: Vec<String>,
    /// Budget level label
    #[serde(
        default,
        deserialize_with = "tolerant::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub budget_level: Option<String>,
    /// Cooking skill label
    #[serde(
        default,
        deserialize_with = "tolerant::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub cooking_skill: Option<String>,
    /// Meals per day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_frequency: Option<Value>,
    /// Fasting window description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fasting_window: Option<Value>,
}

impl MemberInput {
    /// Create a member with only an id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Allergy entries, empty when no profile is declared
    #[must_use]
    pub fn allergies(&self) -> &[AllergyEntry] {
        self.dietary_profile
            .as_ref()
            .map_or(&[], |profile| profile.allergies.as_slice())
    }

    /// Restriction entries, empty when no profile is declared
    #[must_use]
    pub fn restrictions(&self) -> &[RestrictionEntry] {
        self.dietary_profile
            .as_ref()
            .map_or(&[], |profile| profile.restrictions.as_slice())
    }

    /// Declared preferences, if any
    #[must_use]
    pub fn preferences(&self) -> Option<&Preferences> {
        self.dietary_profile
            .as_ref()
            .and_then(|profile| profile.preferences.as_ref())
    }
}

/// Dietary profile of a member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietaryProfile {
    /// Likes and dislikes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    /// Declared allergies
    #[serde(
        default,
        deserialize_with = "tolerant::entries",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub allergies: Vec<AllergyEntry>,
    /// Declared restrictions
    #[serde(
        default,
        deserialize_with = "tolerant::entries",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub restrictions: Vec<RestrictionEntry>,
    /// Free-form health notes
    #[serde(
        default,
        deserialize_with = "tolerant::label",
        skip_serializing_if = "Option::is_none"
    )]
    pub health_notes: Option<String>,
}

/// Preference declaration, either free-text sentences or structured lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Preferences {
    /// Sentences such as "avoid mushrooms, olives"
    FreeText(Vec<Value>),
    /// Explicit likes and dislikes
    Structured(PreferenceLists),
    /// Anything else, ignored by aggregation
    Unrecognized(Value),
}

/// Structured likes and dislikes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceLists {
    /// Liked foods or cuisines
    #[serde(default, deserialize_with = "tolerant::strings")]
    pub likes: Vec<String>,
    /// Disliked foods
    #[serde(default, deserialize_with = "tolerant::strings")]
    pub dislikes: Vec<String>,
}

/// Allergy declaration, a bare name or an object naming the substance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllergyEntry {
    /// Bare substance name
    Name(String),
    /// `{name}` or `{substance}` object
    Detailed(AllergyDetail),
    /// Malformed entry, skipped by aggregation
    Unrecognized(Value),
}

/// Object form of an allergy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyDetail {
    /// Substance name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Alternative substance field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substance: Option<String>,
}

impl AllergyEntry {
    /// Declared substance, `None` for malformed or empty entries
    #[must_use]
    pub fn substance(&self) -> Option<&str> {
        let raw = match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Detailed(detail) => detail
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .or(detail.substance.as_deref()),
            Self::Unrecognized(_) => None,
        };
        raw.filter(|name| !name.is_empty())
    }
}

/// Restriction declaration, a bare reason or a typed object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RestrictionEntry {
    /// Bare reason, always treated as a hard restriction
    Bare(String),
    /// `{type|category, reason|code|name}` object
    Detailed(RestrictionDetail),
    /// Malformed entry, skipped by aggregation
    Unrecognized(Value),
}

/// Object form of a restriction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionDetail {
    /// Restriction type (`FORBIDDEN`, `REDUCED`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub restriction_type: Option<String>,
    /// Alternative type field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Restriction reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Alternative reason field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Alternative reason field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RestrictionDetail {
    /// Declared type, `type` taking precedence over `category`
    #[must_use]
    pub fn declared_type(&self) -> Option<&str> {
        first_present(&[&self.restriction_type, &self.category])
    }

    /// Declared reason, `reason` then `code` then `name`
    #[must_use]
    pub fn declared_reason(&self) -> Option<&str> {
        first_present(&[&self.reason, &self.code, &self.name])
    }
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|candidate| candidate.as_deref())
        .find(|value| !value.is_empty())
}

/// Severity of a dietary restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestrictionType {
    /// Must never be violated (hard restriction)
    Forbidden,
    /// Should be minimized (soft restriction)
    Reduced,
}

impl RestrictionType {
    /// Parse case-insensitively, `None` for unknown labels
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "FORBIDDEN" => Some(Self::Forbidden),
            "REDUCED" => Some(Self::Reduced),
            _ => None,
        }
    }

    /// Wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forbidden => "FORBIDDEN",
            Self::Reduced => "REDUCED",
        }
    }
}

impl RestrictionEntry {
    /// Classified restriction, `None` for malformed entries or unknown types
    #[must_use]
    pub fn classify(&self) -> Option<(RestrictionType, &str)> {
        match self {
            Self::Bare(reason) if !reason.is_empty() => Some((RestrictionType::Forbidden, reason)),
            Self::Detailed(detail) => {
                let reason = detail.declared_reason()?;
                let kind = RestrictionType::parse(detail.declared_type()?)?;
                Some((kind, reason))
            }
            Self::Bare(_) | Self::Unrecognized(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tolerant_entries_deserialize() {
        let member: MemberInput = serde_json::from_value(json!({
            "id": "m-1",
            "dietaryProfile": {
                "allergies": ["Peanuts", {"substance": "milk"}, 42, null],
                "restrictions": ["NO_PORK", {"category": "reduced", "code": "LOW_CARB"}, {"type": "FORBIDDEN"}, 7]
            }
        }))
        .unwrap();

        let substances: Vec<_> = member
            .allergies()
            .iter()
            .filter_map(AllergyEntry::substance)
            .collect();
        assert_eq!(substances, vec!["Peanuts", "milk"]);

        let classified: Vec<_> = member
            .restrictions()
            .iter()
            .filter_map(RestrictionEntry::classify)
            .collect();
        assert_eq!(
            classified,
            vec![
                (RestrictionType::Forbidden, "NO_PORK"),
                (RestrictionType::Reduced, "LOW_CARB"),
            ]
        );
    }

    #[test]
    fn test_null_and_mixed_fields_degrade() {
        let group: GroupInput = serde_json::from_value(json!({
            "id": "g-1",
            "name": null,
            "members": [{
                "id": "m-1",
                "firstName": 7,
                "age": "forty",
                "weightKg": "heavy",
                "healthGoals": null,
                "cuisinePreferences": ["thai", 5, null, "mexican"],
                "dietaryProfile": {
                    "preferences": {"likes": null, "dislikes": ["olives", false]},
                    "allergies": null,
                    "restrictions": "none",
                    "healthNotes": {"text": "n/a"}
                }
            }]
        }))
        .unwrap();

        assert_eq!(group.name, "");
        let member = &group.members[0];
        assert_eq!(member.first_name, None);
        assert_eq!(member.age, None);
        assert_eq!(member.weight_kg, None);
        assert!(member.health_goals.is_empty());
        assert_eq!(member.cuisine_preferences, vec!["thai", "mexican"]);
        assert!(member.allergies().is_empty());
        assert!(member.restrictions().is_empty());
        assert_eq!(
            member.preferences(),
            Some(&Preferences::Structured(PreferenceLists {
                likes: Vec::new(),
                dislikes: vec!["olives".to_owned()],
            }))
        );
    }

    #[test]
    fn test_null_members_read_as_empty_group() {
        let group: GroupInput =
            serde_json::from_value(json!({"id": "g-2", "members": null})).unwrap();
        assert!(group.members.is_empty());
    }

    #[test]
    fn test_preferences_accept_both_shapes() {
        let structured: Preferences =
            serde_json::from_value(json!({"likes": ["pasta"], "dislikes": ["olives"]})).unwrap();
        assert!(matches!(structured, Preferences::Structured(_)));

        let free_text: Preferences =
            serde_json::from_value(json!(["avoid mushrooms", 3])).unwrap();
        assert!(matches!(free_text, Preferences::FreeText(_)));
    }
}
