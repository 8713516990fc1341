// ABOUTME: Error types for input sanitization rejections and output policy blocks
// ABOUTME: Keeps security rejections distinct from type-contract violations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of adversarial content that caused a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityViolation {
    /// "ignore previous instructions" and similar phrasing
    PromptInjection,
    /// `system:`, `prompt:`, `assistant:` prefixes
    RoleSpoofing,
    /// `[INST]` style instruction tags
    InstructionTag,
    /// Script, iframe, `javascript:` or `data:text/html` payloads
    ScriptInjection,
    /// `eval(`, `exec(`, `Function(` calls
    CodeExecution,
    /// `$where`, `$ne`, `$gt`, `$lt`, `$regex` operators
    OperatorInjection,
    /// Any HTML markup or character reference
    HtmlMarkup,
}

impl SecurityViolation {
    /// Stable identifier for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PromptInjection => "prompt_injection",
            Self::RoleSpoofing => "role_spoofing",
            Self::InstructionTag => "instruction_tag",
            Self::ScriptInjection => "script_injection",
            Self::CodeExecution => "code_execution",
            Self::OperatorInjection => "operator_injection",
            Self::HtmlMarkup => "html_markup",
        }
    }
}

impl fmt::Display for SecurityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adversarial or malformed text rejected at the tool boundary.
///
/// Never retried: the same input reproduces the same rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct SecurityError {
    /// Path of the offending field (e.g. `args.group.name`)
    pub field: String,
    /// Category of the violation
    pub violation: SecurityViolation,
}

impl SecurityError {
    /// Create a rejection for a field
    #[must_use]
    pub fn new(field: impl Into<String>, violation: SecurityViolation) -> Self {
        Self {
            field: field.into(),
            violation,
        }
    }
}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violation {
            SecurityViolation::HtmlMarkup => {
                write!(f, "Input rejected: HTML markup detected in {}", self.field)
            }
            _ => write!(
                f,
                "Input rejected: suspicious pattern detected in {}",
                self.field
            ),
        }
    }
}

/// Failure of the input sanitizer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizationError {
    /// Adversarial content was found
    #[error(transparent)]
    Security(#[from] SecurityError),
    /// A non-string value was supplied where a string is required
    #[error("{field} must be a string, received {received}")]
    TypeMismatch {
        /// Path of the field
        field: String,
        /// Type name of the supplied value
        received: &'static str,
    },
}

impl SanitizationError {
    /// Whether this is a security rejection rather than a contract violation
    #[must_use]
    pub const fn is_security(&self) -> bool {
        matches!(self, Self::Security(_))
    }

    /// Path of the field that failed
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Security(inner) => &inner.field,
            Self::TypeMismatch { field, .. } => field,
        }
    }
}

/// Output withheld by the `block` strictness mode
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Output blocked for tool '{tool_name}': {}", finding_types.join(", "))]
pub struct OutputBlockedError {
    /// Tool whose output was blocked
    pub tool_name: String,
    /// Finding types (and `largeOutput`) that triggered the block
    pub finding_types: Vec<String>,
}
