// ABOUTME: The `groups://{groupId}` resource exposing a stored group to agents
// ABOUTME: Serializes groups and members with empty values pruned
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Group Resource
//!
//! Unlike the recipe context, the resource is a faithful (non-anonymized) view of
//! the stored group. Empty strings, nulls and empty collections are pruned so the
//! document only shows what was declared.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::constants::tools::GROUP_RESOURCE_SCHEME;
use crate::errors::{AppError, AppResult};
use crate::models::{GroupInput, MemberInput, ToolValue};
use crate::tools::directory::GroupDirectory;

/// Resource name under which the group template is registered
pub const GROUP_RESOURCE_NAME: &str = "group";
/// URI template of the group resource
pub const GROUP_RESOURCE_TEMPLATE: &str = "groups://{groupId}";

/// One document of a resource read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContent {
    /// URI that was read
    pub uri: String,
    /// Pretty-printed JSON document
    pub text: String,
}

/// Result of a resource read; empty when the group does not exist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContents {
    /// Documents found at the URI
    pub contents: Vec<ResourceContent>,
}

/// Drop nulls, empty strings, and collections left empty after pruning.
///
/// Returns `None` when nothing remains.
#[must_use]
pub fn prune(value: ToolValue) -> Option<ToolValue> {
    match value {
        ToolValue::Null => None,
        ToolValue::String(text) if text.is_empty() => None,
        ToolValue::List(items) => {
            let kept: Vec<ToolValue> = items.into_iter().filter_map(prune).collect();
            (!kept.is_empty()).then_some(ToolValue::List(kept))
        }
        ToolValue::Map(entries) => {
            let kept: BTreeMap<String, ToolValue> = entries
                .into_iter()
                .filter_map(|(key, nested)| prune(nested).map(|pruned| (key, pruned)))
                .collect();
            (!kept.is_empty()).then_some(ToolValue::Map(kept))
        }
        scalar @ (ToolValue::Bool(_)
        | ToolValue::Number(_)
        | ToolValue::String(_)
        | ToolValue::Date(_)) => Some(scalar),
    }
}

/// Member document with body metrics grouped under `metrics`
#[must_use]
pub fn serialize_member(member: &MemberInput) -> Option<ToolValue> {
    let profile = member.dietary_profile.as_ref();
    let document = json!({
        "id": member.id,
        "role": member.role,
        "firstName": member.first_name,
        "lastName": member.last_name,
        "age": member.age,
        "gender": member.gender,
        "metrics": {
            "weightKg": member.weight_kg,
            "heightCm": member.height_cm,
            "activityLevel": member.activity_level,
        },
        "healthGoals": member.health_goals,
        "nutritionTargets": member.nutrition_targets,
        "dietaryProfile": {
            "preferences": profile.and_then(|p| p.preferences.as_ref()),
            "allergies": profile.map(|p| &p.allergies),
            "restrictions": profile.map(|p| &p.restrictions),
            "healthNotes": profile.and_then(|p| p.health_notes.as_ref()),
        },
        "cuisinePreferences": member.cuisine_preferences,
        "budgetLevel": member.budget_level,
        "cookingSkill": member.cooking_skill,
        "mealFrequency": member.meal_frequency,
        "fastingWindow": member.fasting_window,
    });
    prune(ToolValue::from(document))
}

/// Group document with its member count and, optionally, its members
#[must_use]
pub fn structure_group(group: &GroupInput, include_members: bool) -> Option<ToolValue> {
    let members = include_members.then(|| {
        ToolValue::List(
            group
                .members
                .iter()
                .filter_map(serialize_member)
                .collect(),
        )
    });
    let document = ToolValue::Map(
        [
            ("id".to_owned(), ToolValue::from(group.id.as_str())),
            ("name".to_owned(), ToolValue::from(group.name.as_str())),
            (
                "membersCount".to_owned(),
                ToolValue::Number(group.members.len().into()),
            ),
            ("members".to_owned(), members.unwrap_or_default()),
        ]
        .into_iter()
        .collect(),
    );
    prune(document)
}

/// Extract the group id from a `groups://{groupId}` URI
#[must_use]
pub fn parse_group_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix(GROUP_RESOURCE_SCHEME)
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|group_id| !group_id.is_empty() && !group_id.contains('/'))
}

/// Read the group resource at `uri`
///
/// # Errors
///
/// Returns an error if the URI is not a group URI, the directory fails, or the
/// document cannot be rendered
pub async fn read_group_resource<D: GroupDirectory + ?Sized>(
    directory: &D,
    uri: &str,
) -> AppResult<ResourceContents> {
    let group_id = parse_group_uri(uri)
        .ok_or_else(|| AppError::invalid_input(format!("Not a group resource URI: {uri}")))?;
    let Some(group) = directory.get_group(group_id).await? else {
        debug!(group_id = %group_id, "Group resource not found");
        return Ok(ResourceContents::default());
    };
    let document = structure_group(&group, true).unwrap_or_default();
    Ok(ResourceContents {
        contents: vec![ResourceContent {
            uri: uri.to_owned(),
            text: serde_json::to_string_pretty(&document)?,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_prune_removes_empty_values_recursively() {
        let value = ToolValue::from(json!({
            "a": "",
            "b": null,
            "c": [],
            "d": {"e": [null, ""]},
            "f": 0,
            "g": false,
            "h": ["x", ""]
        }));
        assert_eq!(
            prune(value).map(Value::from),
            Some(json!({"f": 0, "g": false, "h": ["x"]}))
        );
    }

    #[test]
    fn test_prune_of_empty_object_is_none() {
        assert_eq!(prune(ToolValue::from(json!({"a": {"b": []}}))), None);
    }

    #[test]
    fn test_parse_group_uri() {
        assert_eq!(parse_group_uri("groups://g1"), Some("g1"));
        assert_eq!(parse_group_uri("groups://"), None);
        assert_eq!(parse_group_uri("recipes://g1"), None);
    }
}
