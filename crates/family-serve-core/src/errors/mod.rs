// ABOUTME: Unified error handling with standard error codes for the tool boundary
// ABOUTME: Defines ErrorCode, AppError and the AppResult alias shared by all crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Unified Error Handling System
//!
//! Standard error codes and the `AppError` type surfaced to tool callers.
//! Domain-specific errors (`SecurityError`, `ToolError`, ...) live in submodules
//! and convert into `AppError` at the boundary.

/// Input sanitization and output policy errors
pub mod security;

/// Group tool errors
pub mod tool;

pub use security::{OutputBlockedError, SanitizationError, SecurityError, SecurityViolation};
pub use tool::ToolError;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// The provided input is invalid
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required field is missing
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// A field has the wrong type or format
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat = 3002,
    /// A value is outside the accepted range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,
    /// Input was rejected as adversarial
    #[serde(rename = "SECURITY_REJECTED")]
    SecurityRejected = 3100,

    // Resource Management (4000-4999)
    /// The requested resource was not found
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,

    // Configuration (6000-6999)
    /// Configuration error
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Configuration is invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Output policy (7000-7999)
    /// Output withheld by the strictness policy
    #[serde(rename = "OUTPUT_BLOCKED")]
    OutputBlocked = 7000,

    // Internal Errors (9000-9999)
    /// Internal error
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Storage collaborator failure
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
    /// Serialization failure
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::InvalidFormat => "The data format is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::SecurityRejected => "The input was rejected by the security filter",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::OutputBlocked => "The response was withheld because it contains sensitive data",
            Self::InternalError => "An internal server error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether retrying the identical request can succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageError | Self::InternalError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Unified error type for the application
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

/// Result alias used across the application
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create an error with a code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source error
    #[must_use]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Storage collaborator error
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::SerializationError,
            format!("JSON processing failed: {error}"),
        )
        .with_source(error)
    }
}

impl From<SecurityError> for AppError {
    fn from(error: SecurityError) -> Self {
        Self::new(ErrorCode::SecurityRejected, error.to_string()).with_source(error)
    }
}

impl From<SanitizationError> for AppError {
    fn from(error: SanitizationError) -> Self {
        match error {
            SanitizationError::Security(inner) => inner.into(),
            type_error @ SanitizationError::TypeMismatch { .. } => {
                Self::new(ErrorCode::InvalidFormat, type_error.to_string()).with_source(type_error)
            }
        }
    }
}

impl From<OutputBlockedError> for AppError {
    fn from(error: OutputBlockedError) -> Self {
        Self::new(ErrorCode::OutputBlocked, error.to_string()).with_source(error)
    }
}

impl From<ToolError> for AppError {
    fn from(error: ToolError) -> Self {
        let code = match &error {
            ToolError::NotFound { .. } => ErrorCode::ResourceNotFound,
            ToolError::InvalidParameter { .. } => ErrorCode::ValueOutOfRange,
            ToolError::MissingParameter { .. } => ErrorCode::MissingRequiredField,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}
