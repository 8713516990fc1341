// ABOUTME: Core types and constants for the family-serve group context platform
// ABOUTME: Foundation crate with error handling, group models, tool values, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

#![deny(unsafe_code)]

//! # Family Serve Core
//!
//! Foundation crate providing shared types and constants for the family-serve
//! meal-planning context platform. This crate is designed to change infrequently,
//! enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, security and tool error types
//! - **constants**: Limits, placeholders, tool names and environment keys
//! - **models**: Group/member inputs, the recipe context output and `ToolValue`

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (groups, members, recipe context, tool payload values)
pub mod models;
