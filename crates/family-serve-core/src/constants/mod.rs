// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Limits, PII placeholders, tool identifiers and environment keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Input sanitization limits
pub mod sanitization {
    /// Maximum characters kept from a single string leaf
    pub const MAX_INPUT_LENGTH: usize = 500;
    /// Root path used when sanitizing tool arguments
    pub const ARGS_ROOT: &str = "args";
    /// Field name used when no field is supplied
    pub const DEFAULT_FIELD: &str = "input";
}

/// Output validation limits and placeholders
pub mod output_validation {
    /// Default character threshold above which an output is flagged as large
    pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 50_000;
    /// Maximum number of samples kept per finding
    pub const MAX_SAMPLES: usize = 3;
    /// Maximum characters kept per sample
    pub const MAX_SAMPLE_CHARS: usize = 64;

    /// Replacement for email addresses
    pub const MASKED_EMAIL: &str = "[MASKED_EMAIL]";
    /// Replacement for phone numbers
    pub const MASKED_PHONE: &str = "[MASKED_PHONE]";
    /// Replacement for social security numbers
    pub const MASKED_SSN: &str = "[MASKED_SSN]";
    /// Replacement for card-like digit runs
    pub const MASKED_CARD: &str = "[MASKED_CARD]";
}

/// Recipe context schema identifiers
pub mod recipe_context {
    /// Discriminator of the recipe context payload
    pub const CONTEXT_TYPE: &str = "group-recipe-context";
    /// Current schema version
    pub const SCHEMA_VERSION: u32 = 1;
    /// Prefix of the content hash
    pub const HASH_PREFIX: &str = "sha256:";
    /// Hex characters of the digest kept in the hash
    pub const HASH_HEX_CHARS: usize = 16;
    /// Prefix of anonymized member aliases
    pub const ALIAS_PREFIX: &str = "M";
}

/// Tool identifiers exposed to agents
pub mod tools {
    /// Resolve a group id from its name
    pub const FIND_GROUP_BY_NAME: &str = "find-group-by-name";
    /// Paginated list of groups without members
    pub const GROUPS_SUMMARY: &str = "groups-summary";
    /// Members filtered by restriction type and reason
    pub const FIND_MEMBERS_BY_RESTRICTION: &str = "find-members-by-restriction";
    /// Aggregated recipe context of one group
    pub const GROUP_RECIPE_CONTEXT: &str = "group-recipe-context";

    /// Discriminator of the group id resolution payload
    pub const GROUP_ID_RESOLUTION_TYPE: &str = "group-id-resolution";
    /// Discriminator of the groups summary payload
    pub const GROUPS_SUMMARY_TYPE: &str = "groups-summary";

    /// Default page size of the groups summary
    pub const DEFAULT_SUMMARY_LIMIT: usize = 20;
    /// Largest accepted page size of the groups summary
    pub const MAX_SUMMARY_LIMIT: usize = 100;

    /// URI scheme of the group resource
    pub const GROUP_RESOURCE_SCHEME: &str = "groups://";
}

/// Dietary configuration file names
pub mod dietary {
    /// Default configuration directory
    pub const DEFAULT_CONFIG_DIR: &str = "config";
    /// Allergen synonym table file
    pub const ALLERGEN_SYNONYMS_FILE: &str = "allergen-synonyms.json";
    /// Preference pattern table file
    pub const PREFERENCE_PATTERNS_FILE: &str = "preference-patterns.json";
    /// Delimiter expression used when none is configured
    pub const DEFAULT_SPLIT_DELIMITERS: &str = ",|;";
}

/// Environment variable names
pub mod env_config {
    /// Strictness mode selector (`warn`, `mask`, `block`)
    pub const OUTPUT_VALIDATION_MODE: &str = "OUTPUT_VALIDATION_MODE";
    /// Large output threshold override
    pub const OUTPUT_VALIDATION_MAX_LENGTH: &str = "OUTPUT_VALIDATION_MAX_LENGTH";
    /// Audit log destination
    pub const OUTPUT_VALIDATION_LOG_PATH: &str = "OUTPUT_VALIDATION_LOG_PATH";
    /// Audit log maximum file size
    pub const OUTPUT_VALIDATION_LOG_MAX_SIZE: &str = "OUTPUT_VALIDATION_LOG_MAX_SIZE";
    /// Audit log retained file count
    pub const OUTPUT_VALIDATION_LOG_MAX_FILES: &str = "OUTPUT_VALIDATION_LOG_MAX_FILES";
    /// Audit log gzip compression toggle
    pub const OUTPUT_VALIDATION_LOG_COMPRESS: &str = "OUTPUT_VALIDATION_LOG_COMPRESS";
    /// Audit log time-based rotation interval
    pub const OUTPUT_VALIDATION_LOG_INTERVAL: &str = "OUTPUT_VALIDATION_LOG_INTERVAL";
    /// Allows callers to request non-anonymized contexts
    pub const ALLOW_RAW_CONTEXT: &str = "ALLOW_RAW_CONTEXT";
    /// Directory holding the dietary configuration tables
    pub const CONFIG_DIR: &str = "FAMILY_SERVE_CONFIG_DIR";
    /// Deployment environment (`development`, `production`, `testing`)
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Diagnostic log output format (`json`, `pretty`, `compact`)
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    /// Service name attached to diagnostic logs
    pub const SERVICE_NAME: &str = "SERVICE_NAME";
}

/// Audit log defaults
pub mod audit {
    /// Default audit log path, relative to the working directory
    pub const DEFAULT_LOG_PATH: &str = "logs/output-validation.log";
    /// Default number of rotated files kept
    pub const DEFAULT_MAX_FILES: usize = 10;
}

/// Service names for structured logging
pub mod service_names {
    /// Service name of the family-serve backend
    pub const FAMILY_SERVE: &str = "family-serve";
}
