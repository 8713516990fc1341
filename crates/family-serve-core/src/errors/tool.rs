// ABOUTME: Errors raised while dispatching a group tool call and decoding its arguments
// ABOUTME: Unknown tools, missing arguments and out-of-range values, mapped onto AppError codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Tool Error Types
//!
//! Every failure here is a caller mistake in the tool name or its arguments.
//! Directory and output failures travel as `AppError` directly.

use std::error::Error;
use std::fmt;

/// Caller errors of a tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Tool was not found
    NotFound {
        /// Name of the requested tool
        tool_name: String,
    },
    /// Argument present but malformed or out of range
    InvalidParameter {
        /// Name of the tool
        tool_name: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Reason the parameter is invalid
        reason: String,
    },
    /// Required argument left out
    MissingParameter {
        /// Name of the tool
        tool_name: String,
        /// Name of the missing parameter
        parameter: String,
    },
}

impl ToolError {
    /// Create a "not found" error
    #[must_use]
    pub fn not_found(tool_name: impl Into<String>) -> Self {
        Self::NotFound {
            tool_name: tool_name.into(),
        }
    }

    /// Create an "invalid parameter" error
    #[must_use]
    pub fn invalid_parameter(
        tool_name: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            tool_name: tool_name.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a "missing parameter" error
    #[must_use]
    pub fn missing_parameter(tool_name: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            tool_name: tool_name.into(),
            parameter: parameter.into(),
        }
    }

    /// Get the tool name associated with this error
    #[must_use]
    pub fn tool_name(&self) -> &str {
        match self {
            Self::NotFound { tool_name }
            | Self::InvalidParameter { tool_name, .. }
            | Self::MissingParameter { tool_name, .. } => tool_name,
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { tool_name } => {
                write!(f, "Tool '{tool_name}' not found")
            }
            Self::InvalidParameter {
                tool_name,
                parameter,
                reason,
            } => {
                write!(
                    f,
                    "Invalid parameter '{parameter}' for tool '{tool_name}': {reason}"
                )
            }
            Self::MissingParameter {
                tool_name,
                parameter,
            } => {
                write!(
                    f,
                    "Missing required parameter '{parameter}' for tool '{tool_name}'"
                )
            }
        }
    }
}

impl Error for ToolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_tool_and_parameter() {
        let missing = ToolError::missing_parameter("group-recipe-context", "id");
        assert_eq!(missing.tool_name(), "group-recipe-context");
        assert_eq!(
            missing.to_string(),
            "Missing required parameter 'id' for tool 'group-recipe-context'"
        );

        let invalid = ToolError::invalid_parameter("groups-summary", "limit", "must be 1..=100");
        assert_eq!(
            invalid.to_string(),
            "Invalid parameter 'limit' for tool 'groups-summary': must be 1..=100"
        );
    }
}
