// ABOUTME: Append-only audit trail of flagged tool outputs
// ABOUTME: JSON lines written by a background task to a rotated, retention-bounded file set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Output Audit Log
//!
//! Entries are serialized on the caller's thread and handed to a background
//! writer over an unbounded channel, so appending never blocks tool handling.
//! [`AuditLog::close`] drains every accepted entry to disk before returning.
//!
//! The audit trail is independent of the diagnostic `tracing` output: writer
//! failures are reported there and never reach tool callers.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::output_validation::OutputValidationFinding;
use crate::config::environment::{AuditLogConfig, OutputValidationMode};
use crate::utils::rotating_file::{RotatingFileWriter, RotationPolicy};

/// One flagged tool output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// When the output was validated
    pub timestamp: DateTime<Utc>,
    /// Tool that produced the output
    pub tool_name: String,
    /// Warnings raised by validation
    pub warnings: Vec<String>,
    /// PII findings
    pub findings: Vec<OutputValidationFinding>,
    /// Output size in characters
    pub size: usize,
    /// Strictness mode in effect
    pub strictness: OutputValidationMode,
}

/// Audit log failures
#[derive(Debug, Error)]
pub enum AuditLogError {
    /// The log file could not be opened
    #[error("Failed to open audit log {path}: {source}")]
    Open {
        /// Path of the log file
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The entry could not be serialized
    #[error("Failed to serialize audit log entry: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The log has been closed
    #[error("Audit log is closed")]
    Closed,
    /// No Tokio runtime is available to run the writer
    #[error("Audit log requires a Tokio runtime")]
    NoRuntime,
    /// The writer task panicked or was cancelled
    #[error("Audit log writer failed: {0}")]
    Writer(String),
}

#[derive(Debug)]
enum AuditCommand {
    Write(String),
    Shutdown,
}

/// Cloneable sender side of an [`AuditLog`]
#[derive(Debug, Clone)]
pub struct AuditLogHandle {
    sender: UnboundedSender<AuditCommand>,
}

impl AuditLogHandle {
    /// Serialize `entry` as one JSON line and enqueue it
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be serialized or the log is closed
    pub fn append<T: Serialize>(&self, entry: &T) -> Result<(), AuditLogError> {
        let line = serde_json::to_string(entry)?;
        self.sender
            .send(AuditCommand::Write(line))
            .map_err(|_| AuditLogError::Closed)
    }
}

/// Rotating JSON-lines audit log owning its background writer
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    handle: AuditLogHandle,
    writer: JoinHandle<()>,
}

impl AuditLog {
    /// Open the log file and start the writer on the current Tokio runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or no runtime is running
    pub fn open(config: &AuditLogConfig) -> Result<Self, AuditLogError> {
        let runtime = Handle::try_current().map_err(|_| AuditLogError::NoRuntime)?;
        let policy = RotationPolicy {
            max_bytes: config.max_size_bytes,
            max_files: config.max_files,
            compress: config.compress,
            interval: config.interval.map(|interval| interval.as_duration()),
        };
        let file = RotatingFileWriter::open(&config.path, policy).map_err(|source| {
            AuditLogError::Open {
                path: config.path.clone(),
                source,
            }
        })?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = runtime.spawn_blocking(move || run_writer(file, receiver));
        info!(path = %config.path.display(), "Audit log opened");

        Ok(Self {
            path: config.path.clone(),
            handle: AuditLogHandle { sender },
            writer,
        })
    }

    /// Sender for validators and other producers
    #[must_use]
    pub fn handle(&self) -> AuditLogHandle {
        self.handle.clone()
    }

    /// Path of the active log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Enqueue one entry
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be serialized or the log is closed
    pub fn append<T: Serialize>(&self, entry: &T) -> Result<(), AuditLogError> {
        self.handle.append(entry)
    }

    /// Stop accepting entries, write every entry already queued, then stop the writer.
    ///
    /// Appends racing with `close` either land in the file or fail with
    /// [`AuditLogError::Closed`]; none are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer task failed
    pub async fn close(self) -> Result<(), AuditLogError> {
        // A send failure means the writer already stopped; the join below reports why
        let _ = self.handle.sender.send(AuditCommand::Shutdown);
        self.writer
            .await
            .map_err(|e| AuditLogError::Writer(e.to_string()))
    }
}

fn run_writer(mut file: RotatingFileWriter, mut receiver: UnboundedReceiver<AuditCommand>) {
    while let Some(command) = receiver.blocking_recv() {
        match command {
            AuditCommand::Write(line) => {
                if let Err(e) = file.write_line(&line) {
                    error!(path = %file.path().display(), "Failed to write audit log entry: {}", e);
                }
            }
            AuditCommand::Shutdown => receiver.close(),
        }
    }
    if let Err(e) = file.flush() {
        error!(path = %file.path().display(), "Failed to flush audit log: {}", e);
    }
    debug!(path = %file.path().display(), "Audit log writer stopped");
}
