// ABOUTME: Extraction of disliked foods from free-text preference sentences
// ABOUTME: Indicator phrases ("avoid", "dislike", "without") introduce delimiter-separated tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::config::dietary::{self, PreferencePatternConfig};
use crate::constants::dietary::DEFAULT_SPLIT_DELIMITERS;

static GLOBAL_MATCHER: OnceLock<PreferencePatternMatcher> = OnceLock::new();

/// Matches indicator phrases at the start of a preference sentence.
///
/// Dislike and avoid indicators are tried before exclude indicators. Within each
/// group longer phrases win, so "does not like" is preferred over "does".
#[derive(Debug, Clone)]
pub struct PreferencePatternMatcher {
    negative_indicators: Vec<String>,
    exclude_indicators: Vec<String>,
    splitter: Option<Regex>,
}

impl Default for PreferencePatternMatcher {
    fn default() -> Self {
        Self::from_config(&PreferencePatternConfig::default())
    }
}

impl PreferencePatternMatcher {
    /// Process-wide matcher built from the configured pattern table on first use
    #[must_use]
    pub fn global() -> &'static Self {
        GLOBAL_MATCHER.get_or_init(|| {
            let config = dietary::preference_patterns_or_empty(&dietary::config_dir());
            Self::from_config(&config)
        })
    }

    /// Build a matcher from a pattern table
    #[must_use]
    pub fn from_config(config: &PreferencePatternConfig) -> Self {
        let negative = config
            .dislike_indicators
            .iter()
            .chain(&config.avoid_indicators);
        let pattern = config
            .split_delimiters_regex
            .as_deref()
            .filter(|pattern| !pattern.is_empty())
            .unwrap_or(DEFAULT_SPLIT_DELIMITERS);

        Self {
            negative_indicators: normalize_indicators(negative),
            exclude_indicators: normalize_indicators(&config.exclude_indicators),
            splitter: compile_splitter(pattern),
        }
    }

    /// Tokens named after the first matching indicator, empty when none matches
    #[must_use]
    pub fn extract_negative_tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return Vec::new();
        }

        self.negative_indicators
            .iter()
            .chain(&self.exclude_indicators)
            .find_map(|indicator| {
                lowered
                    .strip_prefix(indicator.as_str())
                    .filter(|rest| rest.starts_with(' '))
            })
            .map(|rest| self.split_tokens(rest.trim()))
            .unwrap_or_default()
    }

    fn split_tokens(&self, remainder: &str) -> Vec<String> {
        let pieces: Vec<&str> = match &self.splitter {
            Some(splitter) => splitter.split(remainder).collect(),
            None => vec![remainder],
        };
        pieces
            .into_iter()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

fn normalize_indicators<'a>(raw: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut indicators: Vec<String> = raw
        .into_iter()
        .map(|indicator| indicator.trim().to_lowercase())
        .filter(|indicator| !indicator.is_empty() && seen.insert(indicator.clone()))
        .collect();
    indicators.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    indicators
}

fn compile_splitter(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .or_else(|e| {
            warn!(
                "Invalid preference delimiter pattern '{}': {}, using default",
                pattern, e
            );
            Regex::new(DEFAULT_SPLIT_DELIMITERS)
        })
        .ok()
}
