// ABOUTME: Environment configuration for output validation, audit logging and raw context access
// ABOUTME: Parses environment variables into typed settings with warning fallbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! Environment-based configuration.
//!
//! Unknown or malformed values never abort startup: each falls back to its
//! default and is reported as a warning.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::audit::{DEFAULT_LOG_PATH, DEFAULT_MAX_FILES};
use crate::constants::dietary::DEFAULT_CONFIG_DIR;
use crate::constants::env_config;
use crate::constants::output_validation::DEFAULT_MAX_OUTPUT_CHARS;

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    /// Local development
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Strictness applied when a tool output is flagged
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputValidationMode {
    /// Return the output unchanged, findings are logged
    #[default]
    Warn,
    /// Return the output with PII masked
    Mask,
    /// Refuse to return the output
    Block,
}

impl OutputValidationMode {
    /// Parse case-insensitively, `None` for unknown labels
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "warn" => Some(Self::Warn),
            "mask" => Some(Self::Mask),
            "block" => Some(Self::Block),
            _ => None,
        }
    }

    /// Parse from string with fallback to `warn`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            warn!("Unknown output validation mode '{}', using warn", s);
            Self::Warn
        })
    }

    /// Lowercase label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Mask => "mask",
            Self::Block => "block",
        }
    }
}

impl fmt::Display for OutputValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted audit log size limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LogMaxSize {
    /// 10 MiB
    #[default]
    #[serde(rename = "10M")]
    TenMegabytes,
    /// 20 MiB
    #[serde(rename = "20M")]
    TwentyMegabytes,
    /// 50 MiB
    #[serde(rename = "50M")]
    FiftyMegabytes,
    /// 100 MiB
    #[serde(rename = "100M")]
    HundredMegabytes,
}

impl LogMaxSize {
    /// Parse from string with fallback to `10M`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "10M" => Self::TenMegabytes,
            "20M" => Self::TwentyMegabytes,
            "50M" => Self::FiftyMegabytes,
            "100M" => Self::HundredMegabytes,
            other => {
                warn!("Unsupported audit log size '{}', using 10M", other);
                Self::TenMegabytes
            }
        }
    }

    /// Size in bytes
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        const MIB: u64 = 1024 * 1024;
        match self {
            Self::TenMegabytes => 10 * MIB,
            Self::TwentyMegabytes => 20 * MIB,
            Self::FiftyMegabytes => 50 * MIB,
            Self::HundredMegabytes => 100 * MIB,
        }
    }
}

/// Accepted time-based rotation intervals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RotationInterval {
    /// Every minute
    #[serde(rename = "1m")]
    Minute,
    /// Every hour
    #[serde(rename = "1h")]
    Hour,
    /// Every day
    #[serde(rename = "1d")]
    Day,
    /// Every week
    #[serde(rename = "7d")]
    Week,
}

impl RotationInterval {
    /// Parse an interval label, `None` for unsupported labels
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1m" => Some(Self::Minute),
            "1h" => Some(Self::Hour),
            "1d" => Some(Self::Day),
            "7d" => Some(Self::Week),
            _ => None,
        }
    }

    /// Interval length
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        match self {
            Self::Minute => Duration::from_secs(60),
            Self::Hour => Duration::from_secs(60 * 60),
            Self::Day => Duration::from_secs(24 * 60 * 60),
            Self::Week => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Output validation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputValidationConfig {
    /// Strictness applied at the tool boundary
    pub mode: OutputValidationMode,
    /// Character threshold above which an output is flagged as large
    pub max_output_chars: usize,
}

impl Default for OutputValidationConfig {
    fn default() -> Self {
        Self {
            mode: OutputValidationMode::Warn,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }
}

/// Rotating audit log settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditLogConfig {
    /// Path of the active log file
    pub path: PathBuf,
    /// Size at which the active file is rotated
    pub max_size_bytes: u64,
    /// Number of rotated files kept
    pub max_files: usize,
    /// Gzip rotated files
    pub compress: bool,
    /// Optional time-based rotation
    pub interval: Option<RotationInterval>,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            max_size_bytes: LogMaxSize::default().bytes(),
            max_files: DEFAULT_MAX_FILES,
            compress: true,
            interval: None,
        }
    }
}

/// Runtime configuration of the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Output validation settings
    pub output_validation: OutputValidationConfig,
    /// Audit log settings
    pub audit_log: AuditLogConfig,
    /// Whether callers may request non-anonymized recipe contexts
    pub allow_raw_context: bool,
    /// Directory holding the dietary tables
    pub dietary_config_dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from process environment variables
    #[must_use]
    pub fn from_env() -> Self {
        info!("Loading configuration from environment variables");
        let config = Self::from_lookup(|key| env::var(key).ok());
        config.log_summary();
        config
    }

    /// Build configuration from an arbitrary variable source
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = lookup(env_config::OUTPUT_VALIDATION_MODE)
            .map_or(OutputValidationMode::Warn, |raw| {
                OutputValidationMode::from_str_or_default(&raw)
            });

        let max_output_chars = lookup(env_config::OUTPUT_VALIDATION_MAX_LENGTH)
            .and_then(|raw| parse_positive(env_config::OUTPUT_VALIDATION_MAX_LENGTH, &raw))
            .unwrap_or(DEFAULT_MAX_OUTPUT_CHARS);

        let audit_log = AuditLogConfig {
            path: lookup(env_config::OUTPUT_VALIDATION_LOG_PATH)
                .filter(|raw| !raw.trim().is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_PATH), PathBuf::from),
            max_size_bytes: lookup(env_config::OUTPUT_VALIDATION_LOG_MAX_SIZE)
                .map_or_else(LogMaxSize::default, |raw| {
                    LogMaxSize::from_str_or_default(&raw)
                })
                .bytes(),
            max_files: lookup(env_config::OUTPUT_VALIDATION_LOG_MAX_FILES)
                .and_then(|raw| parse_positive(env_config::OUTPUT_VALIDATION_LOG_MAX_FILES, &raw))
                .unwrap_or(DEFAULT_MAX_FILES),
            compress: lookup(env_config::OUTPUT_VALIDATION_LOG_COMPRESS)
                .is_none_or(|raw| raw.trim() != "false"),
            interval: lookup(env_config::OUTPUT_VALIDATION_LOG_INTERVAL).and_then(|raw| {
                let parsed = RotationInterval::parse(&raw);
                if parsed.is_none() {
                    warn!("Unsupported audit log interval '{}', rotating by size only", raw);
                }
                parsed
            }),
        };

        let dietary_config_dir = lookup(env_config::CONFIG_DIR)
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR), PathBuf::from);

        Self {
            environment: lookup(env_config::ENVIRONMENT)
                .map_or_else(Environment::default, |raw| Environment::from_str_or_default(&raw)),
            output_validation: OutputValidationConfig {
                mode,
                max_output_chars,
            },
            audit_log,
            allow_raw_context: lookup(env_config::ALLOW_RAW_CONTEXT).as_deref() == Some("true"),
            dietary_config_dir,
        }
    }

    fn log_summary(&self) {
        info!(
            environment = ?self.environment,
            mode = %self.output_validation.mode,
            max_output_chars = self.output_validation.max_output_chars,
            audit_log = %self.audit_log.path.display(),
            allow_raw_context = self.allow_raw_context,
            "Configuration loaded"
        );
    }
}

fn parse_positive(key: &str, raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!("Invalid {} value '{}', using default", key, raw);
            None
        }
    }
}
