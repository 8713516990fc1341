// ABOUTME: Security tests for tool output validation and strictness enforcement
// ABOUTME: PII detection, masking idempotence, size warnings and warn/mask/block behavior
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{TimeZone, Utc};
use family_serve::config::environment::{OutputValidationConfig, OutputValidationMode};
use family_serve::models::ToolValue;
use family_serve::security::output_validation::{OutputValidationContext, OutputValidator};
use family_serve::tools::ToolBoundary;
use serde_json::{json, Value};

const CONTEXT: OutputValidationContext<'static> = OutputValidationContext {
    tool_name: "group-recipe-context",
};

fn validator(mode: OutputValidationMode, max_output_chars: usize) -> OutputValidator {
    common::init_test_logging();
    OutputValidator::new(&OutputValidationConfig {
        mode,
        max_output_chars,
    })
}

#[test]
fn test_clean_output_is_safe() {
    let output = ToolValue::from(json!({"allergies": [{"substance": "peanut", "count": 2}]}));
    let result = OutputValidator::default().validate_output(output.clone(), CONTEXT);

    assert!(result.safe);
    assert!(result.warnings.is_empty());
    assert!(result.findings.is_empty());
    assert_eq!(result.original_output, output);
}

#[test]
fn test_email_and_phone_detected() {
    let output = ToolValue::from(json!({
        "notes": "Reach sarah@example.com or 555-123-4567",
        "backup": ["sarah@example.com"]
    }));
    let result = OutputValidator::default().validate_output(output, CONTEXT);

    assert!(!result.safe);
    let types: Vec<_> = result.findings.iter().map(|f| f.finding_type.as_str()).collect();
    assert_eq!(types, vec!["email", "phone"]);
    assert_eq!(result.findings[0].occurrences, 2);
    assert_eq!(result.findings[1].samples, vec!["555-123-4567"]);
    assert_eq!(result.warnings.len(), 2);
    assert!(result.warnings[0].contains("group-recipe-context"));
}

#[test]
fn test_ssn_and_card_detected() {
    let output = ToolValue::from("ssn 123-45-6789 card 4111 1111 1111 1111");
    let result = OutputValidator::default().validate_output(output, CONTEXT);

    let types: Vec<_> = result.flagged_types();
    assert_eq!(types, vec!["ssn", "creditCard"]);
}

#[test]
fn test_large_output_flagged() {
    let output = ToolValue::from("x".repeat(40));
    let result = validator(OutputValidationMode::Warn, 16).validate_output(output, CONTEXT);

    assert!(!result.safe);
    assert_eq!(result.size, 40);
    assert!(result.findings.is_empty());
    assert!(result.warnings[0].starts_with("Large output detected (40 chars)"));
    assert_eq!(result.flagged_types(), vec!["largeOutput"]);
}

#[test]
fn test_mask_pii_replaces_and_is_idempotent() {
    let output = ToolValue::from(json!({
        "text": "Email sarah@example.com, call 555-123-4567",
        "count": 3,
        "nested": [{"ssn": "123-45-6789"}]
    }));
    let masked = OutputValidator::mask_pii(&output);
    let rendered = Value::from(masked.clone());

    let text = rendered["text"].as_str().unwrap();
    assert!(text.contains("[MASKED_EMAIL]"));
    assert!(text.contains("[MASKED_PHONE]"));
    assert!(!text.contains("sarah@example.com"));
    assert!(!text.contains("555-123-4567"));
    assert_eq!(rendered["count"], 3);
    assert_eq!(rendered["nested"][0]["ssn"], "[MASKED_SSN]");

    assert_eq!(OutputValidator::mask_pii(&masked), masked);
}

#[test]
fn test_mask_keeps_dates() {
    let date = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let output = ToolValue::Date(date);
    assert_eq!(OutputValidator::mask_pii(&output), output);
}

#[test]
fn test_boundary_warn_returns_original() {
    let boundary = ToolBoundary::new(validator(OutputValidationMode::Warn, 50_000));
    let output = ToolValue::from("sarah@example.com");
    assert_eq!(boundary.enforce("tool", output.clone()).unwrap(), output);
}

#[test]
fn test_boundary_mask_masks_flagged_output() {
    let boundary = ToolBoundary::new(validator(OutputValidationMode::Mask, 50_000));
    assert_eq!(boundary.mode(), OutputValidationMode::Mask);

    let masked = boundary
        .enforce("tool", ToolValue::from("call 555-123-4567"))
        .unwrap();
    assert_eq!(masked, ToolValue::from("call [MASKED_PHONE]"));

    let clean = ToolValue::from("no contact details");
    assert_eq!(boundary.enforce("tool", clean.clone()).unwrap(), clean);
}

#[test]
fn test_boundary_block_names_tool_and_findings() {
    let boundary = ToolBoundary::new(validator(OutputValidationMode::Block, 10));
    let error = boundary
        .enforce("groups-summary", ToolValue::from("sarah@example.com is long"))
        .unwrap_err();

    assert_eq!(error.tool_name, "groups-summary");
    assert_eq!(error.finding_types, vec!["email", "largeOutput"]);
    assert!(error.to_string().contains("groups-summary"));
}
