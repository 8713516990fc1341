// ABOUTME: Tool-boundary security: input sanitization, output validation and audit trail
// ABOUTME: Re-exports the sanitizer, validator and audit log types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Security Module
//!
//! Everything that crosses the tool boundary passes through here: arguments are
//! sanitized on the way in, results are validated on the way out, and flagged
//! results are recorded in the audit log.

/// Rotating audit log of flagged outputs
pub mod audit;
/// PII and size checks on tool outputs
pub mod output_validation;
/// Input normalization and adversarial pattern rejection
pub mod sanitization;

pub use audit::{AuditLog, AuditLogEntry, AuditLogError, AuditLogHandle};
pub use output_validation::{
    OutputValidationContext, OutputValidationFinding, OutputValidationResult, OutputValidator,
    PiiKind,
};
pub use sanitization::InputSanitizer;
