//! Failure reporting: the single "request failed" error kind surfaced to the
//! operator's console.
//!
//! Every failure prints one colored line to stderr. When logging is enabled
//! it is also appended to `~/.switchboard/failures.jsonl`; `switchboard
//! failures` reads that file back. File I/O is best-effort and never fails
//! the panel.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Failure values
// ---------------------------------------------------------------------------

/// A failed request (or a local parse failure that aborted an action).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// What was attempted, e.g. `POST /api/edit/2`.
    pub request: String,
    /// The full error chain.
    pub message: String,
}

impl Failure {
    pub fn new(request: impl Into<String>, error: &anyhow::Error) -> Self {
        Self {
            request: request.into(),
            message: format!("{error:#}"),
        }
    }
}

/// A single line of the failure log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    pub timestamp: String,
    pub request: String,
    pub error: String,
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/// Where failures go: stderr always, the JSONL log when `log_path` is set.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    log_path: Option<PathBuf>,
    quiet: bool,
}

impl Reporter {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            log_path: if config.enabled { failure_log_path() } else { None },
            quiet: false,
        }
    }

    /// Report to `path` only; nothing is printed.
    pub fn to_file(path: PathBuf) -> Self {
        Self {
            log_path: Some(path),
            quiet: true,
        }
    }

    /// Discard every failure.
    pub fn silent() -> Self {
        Self {
            log_path: None,
            quiet: true,
        }
    }

    pub fn report(&self, failure: &Failure) {
        if !self.quiet {
            eprintln!(
                "{} {} {}",
                "request failed:".red().bold(),
                failure.request.bold(),
                failure.message.dimmed()
            );
        }

        if let Some(path) = &self.log_path {
            let entry = FailureEntry {
                timestamp: Utc::now().to_rfc3339(),
                request: failure.request.clone(),
                error: failure.message.clone(),
            };
            let _ = append_entry(path, &entry);
        }
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_entry(path: &Path, entry: &FailureEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Read the newest `limit` entries of the failure log at `path`, oldest
/// first. Malformed lines are skipped; a missing file reads as empty.
pub fn read_recent(path: &Path, limit: usize) -> Vec<FailureEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let entries: Vec<FailureEntry> = BufReader::new(file)
        .lines()
        .map_while(std::result::Result::ok)
        .filter_map(|line| serde_json::from_str::<FailureEntry>(&line).ok())
        .collect();

    let skip = entries.len().saturating_sub(limit);
    entries.into_iter().skip(skip).collect()
}

/// Return the path to the failure log file.
pub fn failure_log_path() -> Option<PathBuf> {
    crate::config::state_dir().map(|dir| dir.join("failures.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
