// ABOUTME: Main library entry point for the family-serve group context platform
// ABOUTME: Recipe context aggregation plus input sanitization and output validation at the tool boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

#![deny(unsafe_code)]

//! # Family Serve
//!
//! Privacy-preserving meal-planning context for families and households. Agents
//! never see raw member records: they call group tools that aggregate a group
//! into a de-identified, deterministic recipe context.
//!
//! ## Architecture
//!
//! - **Intelligence**: allergen synonym index, preference pattern matcher and the
//!   recipe context aggregator
//! - **Security**: input sanitization, output validation and the audit log
//! - **Tools**: the four group tools and the output strictness boundary
//! - **Resources**: the `groups://{groupId}` resource
//! - **Config**: environment settings and the dietary tables
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use family_serve::intelligence::build_recipe_context;
//! use family_serve::models::GroupInput;
//!
//! let group: GroupInput = serde_json::from_str(r#"{"id": "g1", "name": "Smiths"}"#)?;
//! let context = build_recipe_context(&group, true);
//! assert_eq!(context.group.size, 0);
//! # Ok::<(), serde_json::Error>(())
//! ```

pub use family_serve_core::{constants, errors, models};

/// Environment and dietary table configuration
pub mod config;

/// Allergen, preference and recipe context aggregation
pub mod intelligence;

/// Diagnostic logging setup and structured event helpers
pub mod logging;

/// The `groups://{groupId}` resource
pub mod resources;

/// Input sanitization, output validation and the audit log
pub mod security;

/// Group tools and the output boundary
pub mod tools;

/// HTML helpers and rotating file output
pub mod utils;
