// ABOUTME: Utility modules shared across the crate
// ABOUTME: HTML escaping/stripping and rotating file output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

/// HTML escaping and strict markup stripping
pub mod html;
/// Size- and interval-rotated log files
pub mod rotating_file;
