// ABOUTME: Unit tests for logging configuration
// ABOUTME: Validates environment variable handling and format parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use family_serve::logging::{LogFormat, LoggingConfig};
use serial_test::serial;

const LOGGING_VARS: [&str; 4] = ["RUST_LOG", "LOG_FORMAT", "ENVIRONMENT", "SERVICE_NAME"];

fn clear_logging_vars() {
    for key in LOGGING_VARS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_logging_config_from_env() {
    clear_logging_vars();
    env::set_var("RUST_LOG", "debug");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("SERVICE_NAME", "test-service");

    let config = LoggingConfig::from_env();
    clear_logging_vars();

    assert_eq!(config.level, "debug");
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.environment, "production");
    assert_eq!(config.service_name, "test-service");
    assert!(config.include_location);
}

#[test]
#[serial]
fn test_logging_config_without_variables() {
    clear_logging_vars();
    let config = LoggingConfig::from_env();

    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.service_name, "family-serve");
    assert!(!config.include_spans || env::var("LOG_INCLUDE_SPANS").is_ok());
}

#[test]
fn test_default_logging_config() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.environment, "development");
    assert_eq!(config.service_name, "family-serve");
    assert!(!config.include_location);
}

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str_or_default("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::from_str_or_default("compact"), LogFormat::Compact);
    assert_eq!(LogFormat::from_str_or_default("fancy"), LogFormat::Pretty);
}
