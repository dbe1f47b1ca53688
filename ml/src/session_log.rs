//! Session log extraction
//!
//! Pulls six labelled values out of a workflow session log. Each value is
//! optional on its own; a missing label only blanks that value.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use serde::Serialize;

use crate::encoding::decode_text;
use crate::error::{LineageError, Result};

static START_TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Session start time:[ \t]*(.+)").unwrap());
static END_TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Session end time:[ \t]*(.+)").unwrap());
static STATUS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Session status:[ \t]*(.+)").unwrap());
static TOTAL_ROWS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Total Rows Processed:[ \t]*(\d+)").unwrap());
static ROWS_INSERTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Rows Inserted:[ \t]*(\d+)").unwrap());
static ROWS_REJECTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Rows Rejected:[ \t]*(\d+)").unwrap());

/// Column headers for the session sheet, in [`SessionInfo::values`] order
pub const SESSION_COLUMNS: [&str; 6] = [
    "Session Start Time",
    "Session End Time",
    "Status",
    "Total Rows Processed",
    "Rows Inserted",
    "Rows Rejected",
];

/// Values captured from a session log. Counts are kept as the raw digits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
    pub total_rows_processed: Option<String>,
    pub rows_inserted: Option<String>,
    pub rows_rejected: Option<String>,
}

impl SessionInfo {
    /// Read and parse a session log file. Logs that are not UTF-8 are read as Windows-1252.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| LineageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let info = Self::parse(&decode_text(path, &bytes));
        for label in info.missing_labels() {
            warn!("{}: no '{}' line", path.display(), label);
        }
        Ok(info)
    }

    /// Parse log text; the first occurrence of each label wins
    pub fn parse(text: &str) -> Self {
        Self {
            start_time: capture(&START_TIME, text),
            end_time: capture(&END_TIME, text),
            status: capture(&STATUS, text),
            total_rows_processed: capture(&TOTAL_ROWS, text),
            rows_inserted: capture(&ROWS_INSERTED, text),
            rows_rejected: capture(&ROWS_REJECTED, text),
        }
    }

    /// Values in [`SESSION_COLUMNS`] order
    pub fn values(&self) -> [Option<&str>; 6] {
        [
            self.start_time.as_deref(),
            self.end_time.as_deref(),
            self.status.as_deref(),
            self.total_rows_processed.as_deref(),
            self.rows_inserted.as_deref(),
            self.rows_rejected.as_deref(),
        ]
    }

    /// Log labels that were not found
    pub fn missing_labels(&self) -> Vec<&'static str> {
        const LABELS: [&str; 6] = [
            "Session start time:",
            "Session end time:",
            "Session status:",
            "Total Rows Processed:",
            "Rows Inserted:",
            "Rows Rejected:",
        ];
        LABELS
            .iter()
            .zip(self.values())
            .filter(|(_, value)| value.is_none())
            .map(|(label, _)| *label)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(Option::is_none)
    }

    /// Total rows processed as a number, when present and in range
    pub fn total_rows(&self) -> Option<u64> {
        self.total_rows_processed.as_deref().and_then(|v| v.parse().ok())
    }

    pub fn inserted_rows(&self) -> Option<u64> {
        self.rows_inserted.as_deref().and_then(|v| v.parse().ok())
    }

    pub fn rejected_rows(&self) -> Option<u64> {
        self.rows_rejected.as_deref().and_then(|v| v.parse().ok())
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}
