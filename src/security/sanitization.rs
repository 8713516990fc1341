// ABOUTME: Input sanitization for tool arguments before they reach storage or aggregation
// ABOUTME: Normalizes whitespace, truncates, and rejects markup and prompt-injection payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Input Sanitization
//!
//! Every string leaf of a tool argument goes through the same pipeline:
//!
//! 1. tabs, newlines and carriage returns become spaces
//! 2. control characters are stripped
//! 3. whitespace runs collapse to a single space and the ends are trimmed
//! 4. the value is truncated to [`MAX_INPUT_LENGTH`] characters
//! 5. any HTML markup rejects the value
//! 6. any adversarial pattern rejects the value
//!
//! Object keys go through the same checks but are never rewritten.
//!
//! Truncation is a warning. Markup and adversarial patterns abort the whole
//! sanitization with a [`SecurityError`] naming the field path.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::constants::sanitization::{ARGS_ROOT, DEFAULT_FIELD, MAX_INPUT_LENGTH};
use crate::errors::{SanitizationError, SecurityError, SecurityViolation};
use crate::logging::AppLogger;
use crate::models::ToolValue;
use crate::utils::html::{escape_basic_html, strip_markup};

/// Adversarial pattern catalog, checked in order
const ADVERSARIAL_PATTERNS: &[(&str, SecurityViolation)] = &[
    (r"ignore\s+previous\s+instructions", SecurityViolation::PromptInjection),
    (r"forget\s+everything", SecurityViolation::PromptInjection),
    (r"disregard\s+all\s+prior", SecurityViolation::PromptInjection),
    (r"new\s+instructions", SecurityViolation::PromptInjection),
    (r"system\s*:", SecurityViolation::RoleSpoofing),
    (r"prompt\s*:", SecurityViolation::RoleSpoofing),
    (r"assistant\s*:", SecurityViolation::RoleSpoofing),
    (r"\[INST\]", SecurityViolation::InstructionTag),
    (r"\[/INST\]", SecurityViolation::InstructionTag),
    (r"<script[^>]*>", SecurityViolation::ScriptInjection),
    (r"<iframe[^>]*>", SecurityViolation::ScriptInjection),
    (r"javascript:", SecurityViolation::ScriptInjection),
    (r"data:text/html", SecurityViolation::ScriptInjection),
    (r"\beval\s*\(", SecurityViolation::CodeExecution),
    (r"\bexec\s*\(", SecurityViolation::CodeExecution),
    (r"\bFunction\s*\(", SecurityViolation::CodeExecution),
    (r"\$where", SecurityViolation::OperatorInjection),
    (r"\$ne", SecurityViolation::OperatorInjection),
    (r"\$gt", SecurityViolation::OperatorInjection),
    (r"\$lt", SecurityViolation::OperatorInjection),
    (r"\$regex", SecurityViolation::OperatorInjection),
];

/// Compiled catalog; patterns that fail to compile are skipped
static SUSPICIOUS_PATTERNS: LazyLock<Vec<(Regex, SecurityViolation)>> = LazyLock::new(|| {
    ADVERSARIAL_PATTERNS
        .iter()
        .filter_map(|(pattern, violation)| {
            Regex::new(&format!("(?i){pattern}"))
                .map_err(|e| warn!("Skipping invalid sanitizer pattern {}: {}", pattern, e))
                .ok()
                .map(|regex| (regex, *violation))
        })
        .collect()
});

/// Sanitizer applied to every tool argument
pub struct InputSanitizer;

impl InputSanitizer {
    /// Sanitize a single string value.
    ///
    /// `field_name` names the value in errors, `input` when omitted.
    ///
    /// # Errors
    ///
    /// Returns a [`SecurityError`] if the value contains markup or an adversarial pattern
    pub fn sanitize_string(input: &str, field_name: Option<&str>) -> Result<String, SecurityError> {
        let field = field_name.unwrap_or(DEFAULT_FIELD);
        let cleaned = collapse_whitespace(&strip_control_chars(input));
        let cleaned = truncate(cleaned, field);

        if strip_markup(&cleaned) != escape_basic_html(&cleaned) {
            return Err(reject(field, SecurityViolation::HtmlMarkup));
        }
        if let Some((_, violation)) = SUSPICIOUS_PATTERNS
            .iter()
            .find(|(regex, _)| regex.is_match(&cleaned))
        {
            return Err(reject(field, *violation));
        }
        Ok(cleaned)
    }

    /// Sanitize a value that must be a string
    ///
    /// # Errors
    ///
    /// Returns [`SanitizationError::TypeMismatch`] for non-string values and
    /// [`SanitizationError::Security`] for rejected strings
    pub fn require_string(value: &ToolValue, field_name: &str) -> Result<String, SanitizationError> {
        match value {
            ToolValue::String(text) => Ok(Self::sanitize_string(text, Some(field_name))?),
            other => Err(SanitizationError::TypeMismatch {
                field: field_name.to_owned(),
                received: other.type_name(),
            }),
        }
    }

    /// Recursively sanitize every string leaf of `value`.
    ///
    /// Paths are built as `args.group.name` and `args.members[2]`; `path` defaults
    /// to `args`. Non-string scalars and dates pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first [`SecurityError`] met during traversal
    pub fn sanitize_object(value: ToolValue, path: Option<&str>) -> Result<ToolValue, SecurityError> {
        sanitize_at(value, path.unwrap_or(ARGS_ROOT))
    }

    /// Sanitization is always active
    #[must_use]
    pub const fn is_enabled() -> bool {
        true
    }

    /// Maximum characters kept per string value
    #[must_use]
    pub const fn max_length() -> usize {
        MAX_INPUT_LENGTH
    }
}

fn sanitize_at(value: ToolValue, path: &str) -> Result<ToolValue, SecurityError> {
    match value {
        ToolValue::String(text) => InputSanitizer::sanitize_string(&text, Some(path)).map(ToolValue::String),
        ToolValue::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| sanitize_at(item, &format!("{path}[{index}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(ToolValue::List),
        ToolValue::Map(entries) => entries
            .into_iter()
            .map(|(key, nested)| {
                let field = format!("{path}.{key}");
                // Keys are checked but kept verbatim
                InputSanitizer::sanitize_string(&key, Some(&field))?;
                let nested = sanitize_at(nested, &field)?;
                Ok((key, nested))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(ToolValue::Map),
        scalar @ (ToolValue::Null | ToolValue::Bool(_) | ToolValue::Number(_) | ToolValue::Date(_)) => {
            Ok(scalar)
        }
    }
}

fn strip_control_chars(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| match c {
            '\t' | '\n' | '\r' => Some(' '),
            '\u{0}'..='\u{8}' | '\u{b}'..='\u{1f}' | '\u{7f}'..='\u{9f}' => None,
            other => Some(other),
        })
        .collect()
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(cleaned: String, field: &str) -> String {
    if cleaned.chars().count() <= MAX_INPUT_LENGTH {
        return cleaned;
    }
    warn!(
        field = %field,
        max_length = MAX_INPUT_LENGTH,
        "Input truncated to maximum length"
    );
    cleaned.chars().take(MAX_INPUT_LENGTH).collect()
}

fn reject(field: &str, violation: SecurityViolation) -> SecurityError {
    AppLogger::log_input_rejected(field, violation.as_str());
    SecurityError::new(field, violation)
}
