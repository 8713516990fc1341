// ABOUTME: Core data models for groups, recipe contexts and tool payload values
// ABOUTME: Re-exports the model types used across the workspace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

/// Group and member inputs
pub mod group;
/// Aggregated recipe context output
pub mod recipe_context;
/// Nested tool payload values
pub mod value;

pub use group::{
    AllergyDetail, AllergyEntry, DietaryProfile, GroupInput, MemberInput, PreferenceLists,
    Preferences, RestrictionDetail, RestrictionEntry, RestrictionType,
};
pub use recipe_context::{
    AgeGroup, AllergyAggregate, ContextStats, GroupDescriptor, MemberContext, RecipeContext,
    Segments, SoftPreferences,
};
pub use value::ToolValue;
