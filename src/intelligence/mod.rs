// ABOUTME: Dietary intelligence for group recipe contexts
// ABOUTME: Allergen canonicalization, preference extraction and context aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Intelligence Module
//!
//! Turns raw group member data into the compact, de-identified summary consumed
//! by recipe-generating agents.

/// Allergen synonym index
pub mod allergens;
/// Free-text preference indicator matching
pub mod preferences;
/// Group aggregation and content hashing
pub mod recipe_context;

pub use allergens::{normalize_term, AllergenSynonymIndex};
pub use preferences::PreferencePatternMatcher;
pub use recipe_context::{build_recipe_context, context_hash, RecipeContextAggregator};
