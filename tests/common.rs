// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides quiet logging, the shipped dietary tables, and sample groups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `family_serve`

use std::env;
use std::path::PathBuf;
use std::sync::Once;

use family_serve::config::dietary;
use family_serve::config::environment::{OutputValidationConfig, OutputValidationMode};
use family_serve::intelligence::{AllergenSynonymIndex, PreferencePatternMatcher};
use family_serve::models::GroupInput;
use family_serve::security::output_validation::OutputValidator;
use family_serve::tools::{GroupTools, InMemoryGroupDirectory, ToolBoundary};
use serde_json::json;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Directory of the dietary tables shipped with the crate
pub fn shipped_config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

/// Synonym index and pattern matcher built from the shipped tables
pub fn shipped_tables() -> (AllergenSynonymIndex, PreferencePatternMatcher) {
    let dir = shipped_config_dir();
    let synonyms = dietary::load_allergen_synonyms(&dir).unwrap();
    let patterns = dietary::load_preference_patterns(&dir).unwrap();
    (
        AllergenSynonymIndex::from_table(&synonyms),
        PreferencePatternMatcher::from_config(&patterns),
    )
}

/// Two members whose allergies differ only in case
pub fn g1_group() -> GroupInput {
    serde_json::from_value(json!({
        "id": "g1",
        "name": "Peanut Family",
        "members": [
            {"id": "m-1", "dietaryProfile": {"allergies": ["Peanuts"]}},
            {"id": "m-2", "dietaryProfile": {"allergies": ["peanuts"]}}
        ]
    }))
    .unwrap()
}

/// A household exercising every aggregated field
pub fn smith_household() -> GroupInput {
    serde_json::from_value(json!({
        "id": "g-smith",
        "name": "Smith Household",
        "members": [
            {
                "id": "m-alice",
                "role": "ADMIN",
                "firstName": "Alice",
                "lastName": "Smith",
                "age": 41,
                "cookingSkill": "advanced",
                "cuisinePreferences": ["Italian", " thai "],
                "dietaryProfile": {
                    "preferences": ["avoid mushrooms, olives", "I like everything else"],
                    "allergies": ["Tree nuts", {"name": "Milk"}],
                    "restrictions": [
                        {"type": "FORBIDDEN", "reason": "NO_PORK"},
                        {"category": "REDUCED", "code": "LOW_SUGAR"}
                    ]
                }
            },
            {
                "id": "m-bob",
                "firstName": "Bob",
                "lastName": "Smith",
                "age": 15,
                "cookingSkill": "beginner",
                "dietaryProfile": {
                    "preferences": {"likes": ["Mexican"], "dislikes": ["Broccoli"]},
                    "allergies": ["almonds", {"substance": "dairy"}],
                    "restrictions": ["VEGETARIAN"]
                }
            },
            {
                "id": "m-carol",
                "firstName": "Carol",
                "age": 8,
                "cookingSkill": "beginner",
                "dietaryProfile": {
                    "allergies": [42, {"substance": ""}],
                    "restrictions": [{"type": "UNKNOWN", "reason": "IGNORED"}, null]
                }
            },
            {"id": "m-dan", "firstName": "Dan"}
        ]
    }))
    .unwrap()
}

/// Tools over the sample groups with the given strictness
pub fn group_tools(
    mode: OutputValidationMode,
    allow_raw_context: bool,
) -> GroupTools<InMemoryGroupDirectory> {
    init_test_logging();
    let validator = OutputValidator::new(&OutputValidationConfig {
        mode,
        ..OutputValidationConfig::default()
    });
    GroupTools::new(
        InMemoryGroupDirectory::new(vec![g1_group(), smith_household()]),
        ToolBoundary::new(validator),
        allow_raw_context,
    )
}
