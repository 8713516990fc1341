// ABOUTME: Read-only group directory abstraction consumed by the group tools
// ABOUTME: Async GroupDirectory trait, an in-memory implementation, and group document intake
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Group Directory
//!
//! The tools never own storage. They read groups through [`GroupDirectory`], which
//! a persistence layer implements; [`InMemoryGroupDirectory`] serves the CLI and
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppResult;
use crate::models::{GroupInput, MemberInput, RestrictionEntry, RestrictionType, ToolValue};
use crate::security::sanitization::InputSanitizer;

/// Member matched by a restriction query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingMember {
    /// Member id
    pub id: String,
    /// Given name, empty when unknown
    pub first_name: String,
    /// Family name, empty when unknown
    pub last_name: String,
}

impl From<&MemberInput> for MatchingMember {
    fn from(member: &MemberInput) -> Self {
        Self {
            id: member.id.clone(),
            first_name: member.first_name.clone().unwrap_or_default(),
            last_name: member.last_name.clone().unwrap_or_default(),
        }
    }
}

/// Members of one group sharing a restriction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionMatches {
    /// Queried group
    pub group_id: String,
    /// Name of the queried group
    pub group_name: String,
    /// Queried restriction type
    pub restriction_type: RestrictionType,
    /// Queried reason, when one was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Matching members in group order
    pub matching_members: Vec<MatchingMember>,
}

/// Read access to stored groups
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// All groups in storage order
    async fn list_groups(&self) -> AppResult<Vec<GroupInput>>;

    /// Group whose name matches `name`, ignoring case
    async fn find_by_name(&self, name: &str) -> AppResult<Option<GroupInput>>;

    /// Group by id
    async fn get_group(&self, group_id: &str) -> AppResult<Option<GroupInput>>;

    /// Members declaring a restriction of `restriction_type`, optionally with `reason`.
    ///
    /// `None` when the group is unknown or no member matches. Reasons compare
    /// case-insensitively.
    async fn find_members_by_restriction(
        &self,
        group_id: &str,
        restriction_type: RestrictionType,
        reason: Option<&str>,
    ) -> AppResult<Option<RestrictionMatches>> {
        let Some(group) = self.get_group(group_id).await? else {
            return Ok(None);
        };
        let matching_members: Vec<MatchingMember> = group
            .members
            .iter()
            .filter(|member| declares_restriction(member, restriction_type, reason))
            .map(MatchingMember::from)
            .collect();
        if matching_members.is_empty() {
            return Ok(None);
        }
        Ok(Some(RestrictionMatches {
            group_id: group.id,
            group_name: group.name,
            restriction_type,
            reason: reason.map(str::to_owned),
            matching_members,
        }))
    }
}

fn declares_restriction(
    member: &MemberInput,
    restriction_type: RestrictionType,
    reason: Option<&str>,
) -> bool {
    member
        .restrictions()
        .iter()
        .filter_map(RestrictionEntry::classify)
        .any(|(kind, declared)| {
            kind == restriction_type
                && reason.is_none_or(|wanted| declared.eq_ignore_ascii_case(wanted))
        })
}

/// Directory over a fixed list of groups
#[derive(Debug, Clone, Default)]
pub struct InMemoryGroupDirectory {
    groups: Vec<GroupInput>,
}

impl InMemoryGroupDirectory {
    /// Directory serving `groups` in the given order
    #[must_use]
    pub const fn new(groups: Vec<GroupInput>) -> Self {
        Self { groups }
    }

    /// Add a group, replacing any group with the same id
    pub fn insert(&mut self, group: GroupInput) {
        if let Some(existing) = self.groups.iter_mut().find(|stored| stored.id == group.id) {
            *existing = group;
        } else {
            self.groups.push(group);
        }
    }

    /// Number of stored groups
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the directory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Sanitize an externally supplied group document and decode it.
///
/// String leaves are sanitized under the `group` path and the id must be a
/// string before the rest of the document is decoded.
///
/// # Errors
///
/// Returns an error if a string is rejected, the id is missing or not a string,
/// or the document does not describe a group
pub fn parse_group_document(document: ToolValue) -> AppResult<GroupInput> {
    let sanitized = InputSanitizer::sanitize_object(document, Some("group"))?;
    InputSanitizer::require_string(sanitized.get("id").unwrap_or(&ToolValue::Null), "group.id")?;
    Ok(serde_json::from_value(Value::from(sanitized))?)
}

#[async_trait]
impl GroupDirectory for InMemoryGroupDirectory {
    async fn list_groups(&self) -> AppResult<Vec<GroupInput>> {
        Ok(self.groups.clone())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<GroupInput>> {
        let wanted = name.trim();
        Ok(self
            .groups
            .iter()
            .find(|group| group.name.trim().eq_ignore_ascii_case(wanted))
            .cloned())
    }

    async fn get_group(&self, group_id: &str) -> AppResult<Option<GroupInput>> {
        Ok(self.groups.iter().find(|group| group.id == group_id).cloned())
    }
}
