// ABOUTME: Allergen synonym index mapping free-form allergy names to canonical substances
// ABOUTME: Built once from the allergen synonym table and shared process-wide
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::config::dietary::{self, AllergenSynonymTable};

static GLOBAL_INDEX: OnceLock<AllergenSynonymIndex> = OnceLock::new();

/// Case-insensitive lookup from allergen synonyms to canonical substances.
///
/// Lookup never fails: unknown terms come back normalized but otherwise unchanged.
#[derive(Debug, Clone, Default)]
pub struct AllergenSynonymIndex {
    canonical_by_term: HashMap<String, String>,
}

impl AllergenSynonymIndex {
    /// Process-wide index built from the configured synonym table on first use
    #[must_use]
    pub fn global() -> &'static Self {
        GLOBAL_INDEX.get_or_init(|| {
            let table = dietary::allergen_synonyms_or_empty(&dietary::config_dir());
            Self::from_table(&table)
        })
    }

    /// Build an index from a canonical -> synonyms table.
    ///
    /// Every synonym and the canonical term itself map to the lowercase canonical key.
    #[must_use]
    pub fn from_table(table: &AllergenSynonymTable) -> Self {
        let mut canonical_by_term = HashMap::new();
        for (canonical, synonyms) in table {
            let key = canonical.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            for term in synonyms.iter().chain(Some(canonical)) {
                let normalized = normalize_term(term);
                if !normalized.is_empty() {
                    canonical_by_term.insert(normalized, key.clone());
                }
            }
        }
        debug!(terms = canonical_by_term.len(), "Built allergen synonym index");
        Self { canonical_by_term }
    }

    /// Canonical substance for a declared allergy
    #[must_use]
    pub fn canonicalize(&self, term: &str) -> String {
        let normalized = normalize_term(term);
        self.canonical_by_term
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    /// Number of indexed terms
    #[must_use]
    pub fn len(&self) -> usize {
        self.canonical_by_term.len()
    }

    /// Whether the index holds no terms
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.canonical_by_term.is_empty()
    }
}

/// Lowercase, turn `_`/`-` runs into spaces, collapse whitespace, trim
#[must_use]
pub fn normalize_term(raw: &str) -> String {
    raw.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> AllergenSynonymIndex {
        let mut table = AllergenSynonymTable::new();
        table.insert("peanut".into(), vec!["peanuts".into(), "groundnut".into()]);
        table.insert("tree nut".into(), vec!["tree_nuts".into()]);
        AllergenSynonymIndex::from_table(&table)
    }

    #[test]
    fn test_synonyms_resolve_case_insensitively() {
        let index = index();
        assert_eq!(index.canonicalize("Peanuts"), "peanut");
        assert_eq!(index.canonicalize("  GROUNDNUT "), "peanut");
        assert_eq!(index.canonicalize("peanut"), "peanut");
    }

    #[test]
    fn test_separators_are_normalized() {
        let index = index();
        assert_eq!(index.canonicalize("Tree-Nuts"), "tree nut");
        assert_eq!(index.canonicalize("tree   nut"), "tree nut");
    }

    #[test]
    fn test_unknown_terms_pass_through_normalized() {
        let index = index();
        assert_eq!(index.canonicalize("Kiwi__Fruit"), "kiwi fruit");
        assert_eq!(AllergenSynonymIndex::default().canonicalize("Milk"), "milk");
    }
}
