// ABOUTME: Configuration management for environment settings and dietary tables
// ABOUTME: Environment-driven server configuration plus JSON allergen and preference tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! Configuration module
//!
//! - **Environment**: strictness mode, output threshold, audit log rotation and the
//!   raw context switch, all read from environment variables
//! - **Dietary**: the allergen synonym and preference pattern tables shipped in
//!   `config/`

/// Allergen synonym and preference pattern tables
pub mod dietary;
/// Environment and server configuration
pub mod environment;

pub use dietary::{AllergenSynonymTable, DietaryConfigError, PreferencePatternConfig};
pub use environment::{
    AuditLogConfig, Environment, LogMaxSize, OutputValidationConfig, OutputValidationMode,
    RotationInterval, ServerConfig,
};
