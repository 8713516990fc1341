// ABOUTME: Group tools served to recipe-planning agents
// ABOUTME: Directory abstraction, tool handlers, result types and the output boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! Group tool execution
//!
//! Handlers read groups through a [`GroupDirectory`], sanitize their arguments,
//! and return [`ToolResult`]s that pass through the [`ToolBoundary`] before
//! reaching the caller.

/// Output strictness enforcement
pub mod boundary;
/// Read-only group storage abstraction
pub mod directory;
/// The group tool handlers
pub mod group;
/// Tool result types
pub mod result;

pub use boundary::ToolBoundary;
pub use directory::{
    parse_group_document, GroupDirectory, InMemoryGroupDirectory, MatchingMember,
    RestrictionMatches,
};
pub use group::{GroupTools, GROUP_TOOL_NAMES};
pub use result::{ToolContent, ToolResult};
