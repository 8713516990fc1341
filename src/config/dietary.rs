// ABOUTME: Loader for the dietary configuration tables shipped under config/
// ABOUTME: Allergen synonym table and free-text preference indicator phrases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Dietary Configuration
//!
//! Two JSON tables drive the recipe context aggregator:
//!
//! - `allergen-synonyms.json`: canonical allergen -> list of synonyms
//! - `preference-patterns.json`: indicator phrases that introduce dislikes in
//!   free-text preference sentences
//!
//! Both are optional at runtime. A missing or malformed file degrades to an empty
//! table and is reported as a warning.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::dietary::{
    ALLERGEN_SYNONYMS_FILE, DEFAULT_CONFIG_DIR, PREFERENCE_PATTERNS_FILE,
};
use crate::constants::env_config;

/// Canonical allergen -> synonyms, iterated in key order
pub type AllergenSynonymTable = BTreeMap<String, Vec<String>>;

/// Indicator phrases for free-text preference sentences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePatternConfig {
    /// Phrases such as "dislike" or "hates"
    #[serde(default)]
    pub dislike_indicators: Vec<String>,
    /// Phrases such as "avoid" or "no"
    #[serde(default)]
    pub avoid_indicators: Vec<String>,
    /// Phrases such as "exclude" or "without"
    #[serde(default)]
    pub exclude_indicators: Vec<String>,
    /// Regular expression separating tokens after an indicator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_delimiters_regex: Option<String>,
}

/// Failure to read a dietary configuration table
#[derive(Debug, Error)]
pub enum DietaryConfigError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path of the table
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The file is not valid JSON of the expected shape
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Path of the table
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },
}

/// Directory holding the dietary tables (`FAMILY_SERVE_CONFIG_DIR`, default `config`)
#[must_use]
pub fn config_dir() -> PathBuf {
    env::var(env_config::CONFIG_DIR)
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR), PathBuf::from)
}

/// Load the allergen synonym table from `dir`.
///
/// Synonym lists that are not arrays are treated as empty; non-string synonyms are
/// ignored.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON object
pub fn load_allergen_synonyms(dir: &Path) -> Result<AllergenSynonymTable, DietaryConfigError> {
    let raw: BTreeMap<String, Value> = read_json(&dir.join(ALLERGEN_SYNONYMS_FILE))?;
    Ok(raw
        .into_iter()
        .map(|(canonical, synonyms)| {
            let synonyms = match synonyms {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            (canonical, synonyms)
        })
        .collect())
}

/// Load the preference pattern table from `dir`
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match the table shape
pub fn load_preference_patterns(dir: &Path) -> Result<PreferencePatternConfig, DietaryConfigError> {
    read_json(&dir.join(PREFERENCE_PATTERNS_FILE))
}

/// Load the synonym table, degrading to an empty table on failure
#[must_use]
pub fn allergen_synonyms_or_empty(dir: &Path) -> AllergenSynonymTable {
    load_allergen_synonyms(dir).unwrap_or_else(|e| {
        warn!("Failed to load allergen synonyms: {}, using empty table", e);
        AllergenSynonymTable::new()
    })
}

/// Load the preference patterns, degrading to an empty table on failure
#[must_use]
pub fn preference_patterns_or_empty(dir: &Path) -> PreferencePatternConfig {
    load_preference_patterns(dir).unwrap_or_else(|e| {
        warn!("Failed to load preference patterns: {}, using empty table", e);
        PreferencePatternConfig::default()
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, DietaryConfigError> {
    debug!(path = %path.display(), "Loading dietary table");
    let contents = fs::read_to_string(path).map_err(|source| DietaryConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| DietaryConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_synonym_lists_tolerate_bad_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(ALLERGEN_SYNONYMS_FILE),
            r#"{"peanut": ["peanuts", 3, "groundnut"], "milk": "dairy"}"#,
        )
        .unwrap();

        let table = load_allergen_synonyms(dir.path()).unwrap();
        assert_eq!(table["peanut"], vec!["peanuts", "groundnut"]);
        assert!(table["milk"].is_empty());
    }

    #[test]
    fn test_missing_tables_degrade_to_empty() {
        let dir = TempDir::new().unwrap();
        assert!(allergen_synonyms_or_empty(dir.path()).is_empty());
        assert_eq!(
            preference_patterns_or_empty(dir.path()),
            PreferencePatternConfig::default()
        );
    }

    #[test]
    fn test_shipped_tables_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_DIR);
        let table = load_allergen_synonyms(&dir).unwrap();
        assert!(table["peanut"].iter().any(|s| s == "peanuts"));
        let patterns = load_preference_patterns(&dir).unwrap();
        assert!(patterns.avoid_indicators.iter().any(|s| s == "avoid"));
    }
}
