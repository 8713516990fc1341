// ABOUTME: Output validation for tool results before they are returned to an agent
// ABOUTME: Detects PII and oversized payloads, masks PII, and records flagged outputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Output Validation
//!
//! The validator only detects and masks. Deciding what to do with a flagged
//! output is the caller's job (see [`crate::tools::boundary::ToolBoundary`]).

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::audit::{AuditLogEntry, AuditLogHandle};
use crate::config::environment::{OutputValidationConfig, OutputValidationMode};
use crate::constants::output_validation::{
    DEFAULT_MAX_OUTPUT_CHARS, MASKED_CARD, MASKED_EMAIL, MASKED_PHONE, MASKED_SSN, MAX_SAMPLES,
    MAX_SAMPLE_CHARS,
};
use crate::logging::AppLogger;
use crate::models::ToolValue;

/// Kind of personally identifiable information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PiiKind {
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// US social security number (`ddd-dd-dddd`)
    Ssn,
    /// 13 to 16 digits with optional separators
    CreditCard,
}

impl PiiKind {
    /// All kinds, in detection order
    pub const ALL: [Self; 4] = [Self::Email, Self::Phone, Self::Ssn, Self::CreditCard];

    /// Finding type label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Ssn => "ssn",
            Self::CreditCard => "creditCard",
        }
    }

    /// Replacement text used when masking
    #[must_use]
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::Email => MASKED_EMAIL,
            Self::Phone => MASKED_PHONE,
            Self::Ssn => MASKED_SSN,
            Self::CreditCard => MASKED_CARD,
        }
    }

    const fn pattern(&self) -> &'static str {
        match self {
            Self::Email => r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            Self::Phone => r"(\+\d{1,3}[-.]?)?(?:\(\d{3}\)|\d{3})[-.]?\d{3}[-.]?\d{4}\b",
            Self::Ssn => r"\b\d{3}-\d{2}-\d{4}\b",
            Self::CreditCard => r"\b(?:\d[ -]*?){13,16}\b",
        }
    }
}

/// Compiled PII patterns in detection order; patterns that fail to compile are skipped
static PII_PATTERNS: LazyLock<Vec<(PiiKind, Regex)>> = LazyLock::new(|| {
    PiiKind::ALL
        .iter()
        .filter_map(|kind| match Regex::new(kind.pattern()) {
            Ok(regex) => Some((*kind, regex)),
            Err(e) => {
                error!("Failed to compile {} pattern: {}", kind.as_str(), e);
                None
            }
        })
        .collect()
});

/// Identifies the tool whose output is validated
#[derive(Debug, Clone, Copy)]
pub struct OutputValidationContext<'a> {
    /// Tool name used in warnings and audit entries
    pub tool_name: &'a str,
}

/// One kind of PII found in an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputValidationFinding {
    /// Finding type (`email`, `phone`, `ssn`, `creditCard`)
    #[serde(rename = "type")]
    pub finding_type: String,
    /// Total number of matches across the output
    pub occurrences: usize,
    /// Up to three matches, each truncated to 64 characters
    pub samples: Vec<String>,
}

/// Outcome of validating one output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputValidationResult {
    /// Whether no warning was raised
    pub safe: bool,
    /// Human-readable warnings
    pub warnings: Vec<String>,
    /// PII findings in detection order
    pub findings: Vec<OutputValidationFinding>,
    /// Total characters across all string fragments
    pub size: usize,
    /// The validated output, unchanged
    pub original_output: ToolValue,
}

impl OutputValidationResult {
    /// Finding types plus `largeOutput` when the size threshold was exceeded
    #[must_use]
    pub fn flagged_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .findings
            .iter()
            .map(|finding| finding.finding_type.clone())
            .collect();
        if self.warnings.len() > self.findings.len() {
            types.push("largeOutput".to_owned());
        }
        types
    }
}

/// Detects PII and oversized payloads in tool outputs
#[derive(Debug, Clone)]
pub struct OutputValidator {
    max_output_chars: usize,
    mode: OutputValidationMode,
    audit_log: Option<AuditLogHandle>,
}

impl Default for OutputValidator {
    fn default() -> Self {
        Self {
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
            mode: OutputValidationMode::Warn,
            audit_log: None,
        }
    }
}

impl OutputValidator {
    /// Validator using the configured size threshold and strictness label
    #[must_use]
    pub fn new(config: &OutputValidationConfig) -> Self {
        Self {
            max_output_chars: config.max_output_chars,
            mode: config.mode,
            audit_log: None,
        }
    }

    /// Record flagged outputs in the given audit log
    #[must_use]
    pub fn with_audit_log(mut self, audit_log: AuditLogHandle) -> Self {
        self.audit_log = Some(audit_log);
        self
    }

    /// Strictness recorded in audit entries
    #[must_use]
    pub const fn mode(&self) -> OutputValidationMode {
        self.mode
    }

    /// Validate an output.
    ///
    /// Never fails: audit log problems are reported on the diagnostic log only.
    #[must_use]
    pub fn validate_output(
        &self,
        output: ToolValue,
        context: OutputValidationContext<'_>,
    ) -> OutputValidationResult {
        let mut fragments = Vec::new();
        collect_fragments(&output, &mut fragments);
        let size = fragments.iter().map(|fragment| fragment.chars().count()).sum();

        let mut warnings = Vec::new();
        let mut findings = Vec::new();
        for (kind, regex) in PII_PATTERNS.iter() {
            if let Some(finding) = count_occurrences(&fragments, *kind, regex) {
                warnings.push(format!(
                    "Potential {} detected ({}) in {} output",
                    kind.as_str(),
                    finding.occurrences,
                    context.tool_name
                ));
                findings.push(finding);
            }
        }
        if size > self.max_output_chars {
            warnings.push(format!(
                "Large output detected ({size} chars). Consider pagination or limiting response size."
            ));
        }

        let result = OutputValidationResult {
            safe: warnings.is_empty(),
            warnings,
            findings,
            size,
            original_output: output,
        };
        if !result.safe {
            self.record(context.tool_name, &result);
        }
        result
    }

    /// Deep copy of `output` with PII in every string replaced by placeholders.
    ///
    /// Non-string scalars and dates are unchanged. Masking is idempotent.
    #[must_use]
    pub fn mask_pii(output: &ToolValue) -> ToolValue {
        match output {
            ToolValue::String(text) => ToolValue::String(mask_text(text)),
            ToolValue::List(items) => ToolValue::List(items.iter().map(Self::mask_pii).collect()),
            ToolValue::Map(entries) => ToolValue::Map(
                entries
                    .iter()
                    .map(|(key, nested)| (key.clone(), Self::mask_pii(nested)))
                    .collect(),
            ),
            ToolValue::Null | ToolValue::Bool(_) | ToolValue::Number(_) | ToolValue::Date(_) => {
                output.clone()
            }
        }
    }

    fn record(&self, tool_name: &str, result: &OutputValidationResult) {
        let flagged = result.flagged_types();
        let flagged: Vec<&str> = flagged.iter().map(String::as_str).collect();
        AppLogger::log_output_flagged(tool_name, &flagged, self.mode);

        let Some(audit_log) = &self.audit_log else {
            return;
        };
        let entry = AuditLogEntry {
            timestamp: Utc::now(),
            tool_name: tool_name.to_owned(),
            warnings: result.warnings.clone(),
            findings: result.findings.clone(),
            size: result.size,
            strictness: self.mode,
        };
        if let Err(e) = audit_log.append(&entry) {
            warn!("Failed to persist output validation log entry: {}", e);
        }
    }
}

fn mask_text(text: &str) -> String {
    PII_PATTERNS
        .iter()
        .fold(text.to_owned(), |masked, (kind, regex)| {
            regex.replace_all(&masked, kind.placeholder()).into_owned()
        })
}

/// Flatten a value into the text fragments scanned for PII
fn collect_fragments<'v>(value: &'v ToolValue, fragments: &mut Vec<Cow<'v, str>>) {
    match value {
        ToolValue::Null => {}
        ToolValue::Bool(flag) => fragments.push(Cow::Borrowed(if *flag { "true" } else { "false" })),
        ToolValue::Number(number) => fragments.push(Cow::Owned(number.to_string())),
        ToolValue::String(text) => fragments.push(Cow::Borrowed(text)),
        ToolValue::Date(date) => fragments.push(Cow::Owned(ToolValue::date_to_iso(date))),
        ToolValue::List(items) => {
            for item in items {
                collect_fragments(item, fragments);
            }
        }
        ToolValue::Map(entries) => {
            for nested in entries.values() {
                collect_fragments(nested, fragments);
            }
        }
    }
}

fn count_occurrences(
    fragments: &[Cow<'_, str>],
    kind: PiiKind,
    regex: &Regex,
) -> Option<OutputValidationFinding> {
    let mut occurrences = 0;
    let mut samples = Vec::new();
    for found in fragments.iter().flat_map(|fragment| regex.find_iter(fragment)) {
        occurrences += 1;
        if samples.len() < MAX_SAMPLES {
            samples.push(found.as_str().chars().take(MAX_SAMPLE_CHARS).collect());
        }
    }
    (occurrences > 0).then(|| OutputValidationFinding {
        finding_type: kind.as_str().to_owned(),
        occurrences,
        samples,
    })
}
