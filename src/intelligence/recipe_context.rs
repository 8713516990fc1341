// ABOUTME: Aggregation of a group into a de-identified, deterministic recipe context
// ABOUTME: Age segments, canonical allergies, restriction sets, soft preferences and content hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Recipe Context Aggregation
//!
//! Turns a [`GroupInput`] into the [`RecipeContext`] handed to recipe-generating
//! agents. The output is a pure function of the input and the dietary tables:
//! every set is sorted before serialization and the `hash` field is a digest of
//! the canonical JSON of everything else.
//!
//! Malformed allergy, restriction or preference entries are skipped, never
//! rejected.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use super::allergens::AllergenSynonymIndex;
use super::preferences::PreferencePatternMatcher;
use crate::constants::recipe_context::{ALIAS_PREFIX, HASH_HEX_CHARS, HASH_PREFIX};
use crate::models::{
    AgeGroup, AllergyAggregate, AllergyEntry, GroupDescriptor, GroupInput, MemberContext,
    MemberInput, Preferences, RecipeContext, RestrictionEntry, RestrictionType, SoftPreferences,
};

/// Builds recipe contexts from groups
#[derive(Debug, Clone, Copy)]
pub struct RecipeContextAggregator<'a> {
    allergens: &'a AllergenSynonymIndex,
    preferences: &'a PreferencePatternMatcher,
}

impl RecipeContextAggregator<'static> {
    /// Aggregator backed by the process-wide dietary tables
    #[must_use]
    pub fn global() -> Self {
        Self::new(
            AllergenSynonymIndex::global(),
            PreferencePatternMatcher::global(),
        )
    }
}

impl<'a> RecipeContextAggregator<'a> {
    /// Aggregator over explicit dietary tables
    #[must_use]
    pub const fn new(
        allergens: &'a AllergenSynonymIndex,
        preferences: &'a PreferencePatternMatcher,
    ) -> Self {
        Self {
            allergens,
            preferences,
        }
    }

    /// Aggregate a group.
    ///
    /// With `anonymize`, members are listed by id and positional alias only.
    #[must_use]
    pub fn build(&self, group: &GroupInput, anonymize: bool) -> RecipeContext {
        let mut context = RecipeContext::unhashed(GroupDescriptor {
            id: group.id.clone(),
            name: group.name.clone(),
            size: group.members.len(),
        });

        let mut cuisines = BTreeSet::new();
        let mut dislikes = BTreeSet::new();
        let mut allergies: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut hard = BTreeSet::new();
        let mut soft = BTreeSet::new();

        for (index, member) in group.members.iter().enumerate() {
            let age_group = member.age.map(AgeGroup::from_age);
            context.members.push(member_entry(member, index, age_group, anonymize));
            if let Some(band) = age_group {
                *context.segments.age_groups.entry(band).or_insert(0) += 1;
            }

            self.collect_preferences(member, &mut cuisines, &mut dislikes);
            self.collect_allergies(member, &mut allergies);
            collect_restrictions(member, &mut hard, &mut soft);

            if let Some(skill) = member.cooking_skill.as_deref().filter(|s| !s.is_empty()) {
                *context
                    .stats
                    .cooking_skill_spread
                    .entry(skill.to_owned())
                    .or_insert(0) += 1;
            }
        }

        context.allergies = rank_allergies(allergies);
        context.hard_restrictions = hard.into_iter().collect();
        context.soft_restrictions = soft.into_iter().collect();
        context.soft_preferences = soft_preferences(cuisines, dislikes);
        context.hash = context_hash(&context);

        debug!(
            group.id = %context.group.id,
            group.size = context.group.size,
            anonymize,
            hash = %context.hash,
            "Built recipe context"
        );
        context
    }

    fn collect_preferences(
        &self,
        member: &MemberInput,
        cuisines: &mut BTreeSet<String>,
        dislikes: &mut BTreeSet<String>,
    ) {
        cuisines.extend(member.cuisine_preferences.iter().filter_map(|c| normalized(c)));

        match member.preferences() {
            Some(Preferences::Structured(lists)) => {
                cuisines.extend(lists.likes.iter().filter_map(|c| normalized(c)));
                dislikes.extend(lists.dislikes.iter().filter_map(|d| normalized(d)));
            }
            Some(Preferences::FreeText(sentences)) => {
                for sentence in sentences.iter().filter_map(Value::as_str) {
                    dislikes.extend(
                        self.preferences
                            .extract_negative_tokens(sentence)
                            .iter()
                            .filter_map(|token| normalized(token)),
                    );
                }
            }
            Some(Preferences::Unrecognized(_)) | None => {}
        }
    }

    fn collect_allergies(&self, member: &MemberInput, allergies: &mut BTreeMap<String, Vec<String>>) {
        for raw in member.allergies().iter().filter_map(AllergyEntry::substance) {
            let substance = self.allergens.canonicalize(raw);
            if substance.is_empty() {
                continue;
            }
            let members = allergies.entry(substance).or_default();
            if !members.contains(&member.id) {
                members.push(member.id.clone());
            }
        }
    }
}

/// Aggregate a group with the process-wide dietary tables
#[must_use]
pub fn build_recipe_context(group: &GroupInput, anonymize: bool) -> RecipeContext {
    RecipeContextAggregator::global().build(group, anonymize)
}

fn member_entry(
    member: &MemberInput,
    index: usize,
    age_group: Option<AgeGroup>,
    anonymize: bool,
) -> MemberContext {
    if anonymize {
        MemberContext {
            id: member.id.clone(),
            alias: Some(format!("{ALIAS_PREFIX}{}", index + 1)),
            first_name: None,
            last_name: None,
            age_group,
        }
    } else {
        MemberContext {
            id: member.id.clone(),
            alias: None,
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            age_group,
        }
    }
}

fn collect_restrictions(member: &MemberInput, hard: &mut BTreeSet<String>, soft: &mut BTreeSet<String>) {
    for (kind, reason) in member.restrictions().iter().filter_map(RestrictionEntry::classify) {
        match kind {
            RestrictionType::Forbidden => hard.insert(reason.to_owned()),
            RestrictionType::Reduced => soft.insert(reason.to_owned()),
        };
    }
}

fn rank_allergies(allergies: BTreeMap<String, Vec<String>>) -> Vec<AllergyAggregate> {
    // BTreeMap order gives ascending substance; the stable sort keeps it for ties
    let mut ranked: Vec<AllergyAggregate> = allergies
        .into_iter()
        .map(|(substance, members)| AllergyAggregate {
            count: members.len(),
            substance,
            members,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

fn soft_preferences(cuisines: BTreeSet<String>, dislikes: BTreeSet<String>) -> Option<SoftPreferences> {
    let non_empty = |set: BTreeSet<String>| -> Option<Vec<String>> {
        (!set.is_empty()).then(|| set.into_iter().collect())
    };
    let preferences = SoftPreferences {
        cuisines_liked: non_empty(cuisines),
        dislikes: non_empty(dislikes),
    };
    (preferences.cuisines_liked.is_some() || preferences.dislikes.is_some()).then_some(preferences)
}

fn normalized(raw: &str) -> Option<String> {
    let value = raw.trim().to_lowercase();
    (!value.is_empty()).then_some(value)
}

/// `sha256:` + 16 hex characters over the canonical JSON of the context without `hash`.
///
/// Canonical JSON sorts object keys; the member list is covered, so contexts
/// differing only in anonymization have different hashes.
#[must_use]
pub fn context_hash(context: &RecipeContext) -> String {
    let canonical = match serde_json::to_value(context) {
        Ok(Value::Object(mut fields)) => {
            fields.remove("hash");
            sort_keys(Value::Object(fields)).to_string()
        }
        Ok(other) => other.to_string(),
        Err(e) => {
            error!("Failed to serialize recipe context for hashing: {}", e);
            String::new()
        }
    };
    let digest = hex::encode(Sha256::digest(canonical.as_bytes()));
    format!("{HASH_PREFIX}{}", &digest[..HASH_HEX_CHARS])
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let sorted: BTreeMap<String, Value> = fields
                .into_iter()
                .map(|(key, nested)| (key, sort_keys(nested)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::dietary::{AllergenSynonymTable, PreferencePatternConfig};
    use serde_json::json;

    fn tables() -> (AllergenSynonymIndex, PreferencePatternMatcher) {
        let mut synonyms = AllergenSynonymTable::new();
        synonyms.insert("peanut".into(), vec!["peanuts".into()]);
        let patterns = PreferencePatternConfig {
            avoid_indicators: vec!["avoid".into()],
            ..PreferencePatternConfig::default()
        };
        (
            AllergenSynonymIndex::from_table(&synonyms),
            PreferencePatternMatcher::from_config(&patterns),
        )
    }

    #[test]
    fn test_hash_excludes_itself() {
        let (allergens, preferences) = tables();
        let group: GroupInput = serde_json::from_value(json!({"id": "g", "name": "G"})).unwrap();
        let context = RecipeContextAggregator::new(&allergens, &preferences).build(&group, true);

        assert!(context.hash.starts_with("sha256:"));
        assert_eq!(context.hash.len(), "sha256:".len() + 16);
        assert_eq!(context_hash(&context), context.hash);
    }

    #[test]
    fn test_allergy_ties_sorted_by_substance() {
        let ranked = rank_allergies(BTreeMap::from([
            ("soy".to_owned(), vec!["a".to_owned()]),
            ("egg".to_owned(), vec!["b".to_owned()]),
            ("milk".to_owned(), vec!["a".to_owned(), "b".to_owned()]),
        ]));
        let order: Vec<_> = ranked.iter().map(|a| a.substance.as_str()).collect();
        assert_eq!(order, vec!["milk", "egg", "soy"]);
    }

    #[test]
    fn test_soft_preferences_absent_when_empty() {
        assert_eq!(soft_preferences(BTreeSet::new(), BTreeSet::new()), None);
        let only_dislikes = soft_preferences(BTreeSet::new(), BTreeSet::from(["olives".to_owned()]));
        assert_eq!(
            only_dislikes,
            Some(SoftPreferences {
                cuisines_liked: None,
                dislikes: Some(vec!["olives".to_owned()]),
            })
        );
    }
}
