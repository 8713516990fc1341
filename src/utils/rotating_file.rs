// ABOUTME: Size- and interval-rotated append-only file with bounded retention
// ABOUTME: Rotated files are shifted to .1 .. .N and optionally gzip-compressed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

/// When and how the active file is rotated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size at which the active file is rotated
    pub max_bytes: u64,
    /// Number of rotated files kept, at least one
    pub max_files: usize,
    /// Gzip rotated files
    pub compress: bool,
    /// Rotate when the active file is older than this
    pub interval: Option<Duration>,
}

/// Line-oriented writer over `path`, rotated according to a [`RotationPolicy`].
///
/// The active file keeps its name; the most recent rotated file is `path.1`
/// (`path.1.gz` when compressed) and the oldest kept is `path.{max_files}`.
#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    policy: RotationPolicy,
    file: Option<File>,
    written: u64,
    opened_at: Instant,
}

impl RotatingFileWriter {
    /// Open `path` for appending, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            policy: RotationPolicy {
                max_files: policy.max_files.max(1),
                ..policy
            },
            file: Some(file),
            written,
            opened_at: Instant::now(),
        })
    }

    /// Path of the active file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `line` followed by a newline, rotating first when due
    ///
    /// # Errors
    ///
    /// Returns an error if rotating or writing fails
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let incoming = line.len() as u64 + 1;
        if self.rotation_due(incoming) {
            self.rotate()?;
        }
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => self.file.insert(open_append(&self.path)?),
        };
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        self.written += incoming;
        Ok(())
    }

    /// Flush buffered data to disk
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails
    pub fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.sync_data(),
            None => Ok(()),
        }
    }

    fn rotation_due(&self, incoming: u64) -> bool {
        let size_due = self.written > 0 && self.written + incoming > self.policy.max_bytes;
        let age_due = self.written > 0
            && self
                .policy
                .interval
                .is_some_and(|interval| self.opened_at.elapsed() >= interval);
        size_due || age_due
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }

        let max_files = self.policy.max_files;
        for compressed in [false, true] {
            let oldest = self.rotated_path(max_files, compressed);
            if oldest.exists() {
                fs::remove_file(oldest)?;
            }
        }
        for index in (1..max_files).rev() {
            for compressed in [false, true] {
                let from = self.rotated_path(index, compressed);
                if from.exists() {
                    fs::rename(&from, self.rotated_path(index + 1, compressed))?;
                }
            }
        }

        let first = self.rotated_path(1, false);
        fs::rename(&self.path, &first)?;
        if self.policy.compress {
            gzip_file(&first, &self.rotated_path(1, true))?;
            fs::remove_file(&first)?;
        }
        debug!(path = %self.path.display(), "Rotated log file");

        self.file = Some(open_append(&self.path)?);
        self.written = 0;
        self.opened_at = Instant::now();
        Ok(())
    }

    fn rotated_path(&self, index: usize, compressed: bool) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(OsString::new, ToOwned::to_owned);
        name.push(format!(".{index}"));
        if compressed {
            name.push(".gz");
        }
        self.path.with_file_name(name)
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn gzip_file(source: &Path, destination: &Path) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(destination)?), Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn policy(max_bytes: u64, max_files: usize, compress: bool) -> RotationPolicy {
        RotationPolicy {
            max_bytes,
            max_files,
            compress,
            interval: None,
        }
    }

    #[test]
    fn test_rotates_when_size_exceeded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.log");
        let mut writer = RotatingFileWriter::open(&path, policy(16, 3, false)).unwrap();

        writer.write_line("0123456789").unwrap();
        writer.write_line("abcdefghij").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "abcdefghij\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("audit.log.1")).unwrap(),
            "0123456789\n"
        );
    }

    #[test]
    fn test_retention_drops_oldest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.log");
        let mut writer = RotatingFileWriter::open(&path, policy(4, 2, false)).unwrap();

        for line in ["one", "two", "three", "four"] {
            writer.write_line(line).unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "four\n");
        assert_eq!(fs::read_to_string(dir.path().join("audit.log.1")).unwrap(), "three\n");
        assert_eq!(fs::read_to_string(dir.path().join("audit.log.2")).unwrap(), "two\n");
        assert!(!dir.path().join("audit.log.3").exists());
    }

    #[test]
    fn test_interval_rotation_alongside_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.log");
        let mut writer = RotatingFileWriter::open(
            &path,
            RotationPolicy {
                interval: Some(Duration::ZERO),
                ..policy(1024, 2, true)
            },
        )
        .unwrap();

        writer.write_line("first").unwrap();
        writer.write_line("second").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
        let mut rotated = String::new();
        GzDecoder::new(File::open(dir.path().join("audit.log.1.gz")).unwrap())
            .read_to_string(&mut rotated)
            .unwrap();
        assert_eq!(rotated, "first\n");
    }

    #[test]
    fn test_compressed_rotation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.log");
        let mut writer = RotatingFileWriter::open(&path, policy(4, 2, true)).unwrap();

        writer.write_line("first").unwrap();
        writer.write_line("second").unwrap();

        assert!(dir.path().join("audit.log.1.gz").exists());
        assert!(!dir.path().join("audit.log.1").exists());
    }
}
