// ABOUTME: The four group tools exposed to recipe-planning agents
// ABOUTME: Name lookup, paginated summary, restriction filter and recipe context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Group Tools
//!
//! Every handler sanitizes its raw arguments before decoding them, and every
//! answer leaves through [`ToolBoundary`]. Lookups that find nothing answer with
//! a plain text message instead of an error.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::boundary::ToolBoundary;
use super::directory::GroupDirectory;
use super::result::ToolResult;
use crate::config::environment::ServerConfig;
use crate::constants::recipe_context::SCHEMA_VERSION;
use crate::constants::tools::{
    DEFAULT_SUMMARY_LIMIT, FIND_GROUP_BY_NAME, FIND_MEMBERS_BY_RESTRICTION,
    GROUPS_SUMMARY, GROUPS_SUMMARY_TYPE, GROUP_ID_RESOLUTION_TYPE, GROUP_RECIPE_CONTEXT,
    MAX_SUMMARY_LIMIT,
};
use crate::errors::{AppError, AppResult, ToolError};
use crate::intelligence::RecipeContextAggregator;
use crate::logging::AppLogger;
use crate::models::{RestrictionType, ToolValue};
use crate::security::audit::AuditLogHandle;
use crate::security::output_validation::OutputValidator;
use crate::security::sanitization::InputSanitizer;

/// Names of the tools served by [`GroupTools`], in registration order
pub const GROUP_TOOL_NAMES: [&str; 4] = [
    FIND_GROUP_BY_NAME,
    GROUPS_SUMMARY,
    FIND_MEMBERS_BY_RESTRICTION,
    GROUP_RECIPE_CONTEXT,
];

/// Arguments of `find-group-by-name`
#[derive(Debug, Clone, Deserialize)]
pub struct FindGroupByNameArgs {
    /// Group name to resolve
    pub name: String,
}

/// Arguments of `groups-summary`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupsSummaryArgs {
    /// Page size, 1 to 100
    #[serde(default)]
    pub limit: Option<i64>,
    /// Number of groups skipped
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Arguments of `find-members-by-restriction`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMembersByRestrictionArgs {
    /// Group to search
    pub group_id: String,
    /// `FORBIDDEN` or `REDUCED`
    pub restriction_type: RestrictionType,
    /// Optional reason filter
    #[serde(default)]
    pub reason: Option<String>,
}

/// Arguments of `group-recipe-context`
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecipeContextArgs {
    /// Group id
    pub id: String,
    /// Ask for a named context; only honored when raw contexts are allowed
    #[serde(default)]
    pub anonymize: Option<bool>,
}

/// Payload of `find-group-by-name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupIdResolution {
    /// Always `group-id-resolution`
    #[serde(rename = "type")]
    pub payload_type: String,
    /// Payload schema version
    pub schema_version: u32,
    /// Resolved id
    pub id: String,
    /// Stored group name
    pub name: String,
}

/// One group in a summary page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummaryItem {
    /// Group id
    pub id: String,
    /// Group name
    pub name: String,
    /// Number of members
    pub members_count: usize,
}

/// Payload of `groups-summary`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupsSummary {
    /// Always `groups-summary`
    #[serde(rename = "type")]
    pub payload_type: String,
    /// Payload schema version
    pub schema_version: u32,
    /// Number of stored groups
    pub total: usize,
    /// Requested page size
    pub limit: usize,
    /// Requested offset
    pub offset: usize,
    /// Number of groups in this page
    pub count: usize,
    /// The page
    pub groups: Vec<GroupSummaryItem>,
}

/// Group tool handlers over a [`GroupDirectory`]
pub struct GroupTools<D> {
    directory: D,
    aggregator: RecipeContextAggregator<'static>,
    boundary: ToolBoundary,
    allow_raw_context: bool,
}

impl<D: GroupDirectory> GroupTools<D> {
    /// Tools with the process-wide dietary tables
    #[must_use]
    pub fn new(directory: D, boundary: ToolBoundary, allow_raw_context: bool) -> Self {
        Self {
            directory,
            aggregator: RecipeContextAggregator::global(),
            boundary,
            allow_raw_context,
        }
    }

    /// Tools configured from the server configuration, auditing flagged outputs
    /// to `audit_log` when given
    #[must_use]
    pub fn from_config(
        directory: D,
        config: &ServerConfig,
        audit_log: Option<AuditLogHandle>,
    ) -> Self {
        let validator = OutputValidator::new(&config.output_validation);
        let validator = match audit_log {
            Some(handle) => validator.with_audit_log(handle),
            None => validator,
        };
        Self::new(directory, ToolBoundary::new(validator), config.allow_raw_context)
    }

    /// The underlying directory
    #[must_use]
    pub const fn directory(&self) -> &D {
        &self.directory
    }

    /// Run a tool by name and pass its result through the output boundary
    ///
    /// # Errors
    ///
    /// Returns an error for unknown tools, rejected or malformed arguments,
    /// directory failures, and outputs blocked by the strictness mode
    pub async fn call(&self, tool_name: &str, args: ToolValue) -> AppResult<ToolResult> {
        let started = Instant::now();
        let outcome = match tool_name {
            FIND_GROUP_BY_NAME => self.find_group_by_name(args).await,
            GROUPS_SUMMARY => self.groups_summary(args).await,
            FIND_MEMBERS_BY_RESTRICTION => self.find_members_by_restriction(args).await,
            GROUP_RECIPE_CONTEXT => self.group_recipe_context(args).await,
            unknown => Err(ToolError::not_found(unknown).into()),
        }
        .and_then(|result| self.boundary.enforce_result(tool_name, result));

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_tool_call(tool_name, outcome.is_ok(), duration_ms);
        if let Err(e) = &outcome {
            warn!(tool = %tool_name, code = ?e.code, "Tool call failed: {}", e);
        }
        outcome
    }

    /// Resolve a group id from its name
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are rejected or the directory fails
    pub async fn find_group_by_name(&self, args: ToolValue) -> AppResult<ToolResult> {
        let args: FindGroupByNameArgs = decode_args(FIND_GROUP_BY_NAME, args)?;
        let Some(group) = self.directory.find_by_name(&args.name).await? else {
            return Ok(ToolResult::text(format!(
                "No group found for name: {}",
                args.name
            )));
        };
        let payload = GroupIdResolution {
            payload_type: GROUP_ID_RESOLUTION_TYPE.to_owned(),
            schema_version: SCHEMA_VERSION,
            id: group.id,
            name: group.name,
        };
        Ok(ToolResult::structured(&payload)?)
    }

    /// Page through groups without their members
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are rejected or out of range, or the
    /// directory fails
    pub async fn groups_summary(&self, args: ToolValue) -> AppResult<ToolResult> {
        let args: GroupsSummaryArgs = decode_args(GROUPS_SUMMARY, args)?;
        let limit = page_bound(args.limit, "limit", DEFAULT_SUMMARY_LIMIT, 1, MAX_SUMMARY_LIMIT)?;
        let offset = page_bound(args.offset, "offset", 0, 0, usize::MAX)?;

        let groups = self.directory.list_groups().await?;
        let page: Vec<GroupSummaryItem> = groups
            .iter()
            .skip(offset)
            .take(limit)
            .map(|group| GroupSummaryItem {
                id: group.id.clone(),
                name: group.name.clone(),
                members_count: group.members.len(),
            })
            .collect();
        let payload = GroupsSummary {
            payload_type: GROUPS_SUMMARY_TYPE.to_owned(),
            schema_version: SCHEMA_VERSION,
            total: groups.len(),
            limit,
            offset,
            count: page.len(),
            groups: page,
        };
        Ok(ToolResult::structured(&payload)?)
    }

    /// Members of a group declaring a restriction
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are rejected or the directory fails
    pub async fn find_members_by_restriction(&self, args: ToolValue) -> AppResult<ToolResult> {
        let args: FindMembersByRestrictionArgs = decode_args(FIND_MEMBERS_BY_RESTRICTION, args)?;
        let matches = self
            .directory
            .find_members_by_restriction(
                &args.group_id,
                args.restriction_type,
                args.reason.as_deref(),
            )
            .await?;
        match matches {
            Some(matches) => Ok(ToolResult::structured_pretty(&matches)?),
            None => Ok(ToolResult::text("Group not found or no matching members")),
        }
    }

    /// Aggregated recipe context of a group.
    ///
    /// Contexts are anonymized unless raw contexts are allowed and the caller
    /// passes `anonymize: false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are rejected or the directory fails
    pub async fn group_recipe_context(&self, args: ToolValue) -> AppResult<ToolResult> {
        let args: GroupRecipeContextArgs = decode_args(GROUP_RECIPE_CONTEXT, args)?;
        let anonymize = if self.allow_raw_context {
            args.anonymize.unwrap_or(true)
        } else {
            true
        };
        let Some(group) = self.directory.get_group(&args.id).await? else {
            return Ok(ToolResult::text(format!("Group not found: {}", args.id)));
        };
        debug!(group_id = %group.id, anonymize, "Building recipe context");
        let context = self.aggregator.build(&group, anonymize);
        Ok(ToolResult::structured(&context)?)
    }
}

/// Sanitize raw arguments, then decode them into the tool's argument type
fn decode_args<T: DeserializeOwned>(tool_name: &str, args: ToolValue) -> AppResult<T> {
    let args = if args.is_null() {
        ToolValue::Map(BTreeMap::new())
    } else {
        args
    };
    let sanitized = InputSanitizer::sanitize_object(args, None)?;
    serde_json::from_value(Value::from(sanitized)).map_err(|e| {
        let reason = e.to_string();
        let error = match missing_field(&reason) {
            Some(parameter) => ToolError::missing_parameter(tool_name, parameter),
            None => ToolError::invalid_parameter(tool_name, "arguments", reason),
        };
        AppError::from(error)
    })
}

/// Field named by a serde "missing field `x`" message
fn missing_field(reason: &str) -> Option<&str> {
    reason
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(field, _)| field)
}

fn page_bound(
    requested: Option<i64>,
    parameter: &str,
    default: usize,
    min: usize,
    max: usize,
) -> AppResult<usize> {
    let Some(requested) = requested else {
        return Ok(default);
    };
    usize::try_from(requested)
        .ok()
        .filter(|value| (min..=max).contains(value))
        .ok_or_else(|| {
            ToolError::invalid_parameter(
                GROUPS_SUMMARY,
                parameter,
                format!("must be between {min} and {max}, got {requested}"),
            )
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_page_bound_defaults_and_range() {
        assert_eq!(page_bound(None, "limit", 20, 1, 100).unwrap(), 20);
        assert_eq!(page_bound(Some(100), "limit", 20, 1, 100).unwrap(), 100);
        assert!(page_bound(Some(0), "limit", 20, 1, 100).is_err());
        assert!(page_bound(Some(101), "limit", 20, 1, 100).is_err());
        assert!(page_bound(Some(-1), "offset", 0, 0, usize::MAX).is_err());
    }

    #[test]
    fn test_decode_reports_missing_field() {
        let error = decode_args::<FindGroupByNameArgs>(FIND_GROUP_BY_NAME, ToolValue::Null)
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::MissingRequiredField);
        assert!(error.message.contains("'name'"));
    }

    #[test]
    fn test_decode_reports_wrong_type_as_invalid() {
        let args = ToolValue::from(serde_json::json!({"name": 12}));
        let error = decode_args::<FindGroupByNameArgs>(FIND_GROUP_BY_NAME, args).unwrap_err();
        assert_eq!(error.code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn test_missing_field_parsing() {
        assert_eq!(missing_field("missing field `groupId`"), Some("groupId"));
        assert_eq!(missing_field("invalid type: integer `12`"), None);
    }
}
