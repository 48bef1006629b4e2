//! Report export.
//!
//! The report is a single JSON document:
//!
//! ```json
//! {"subs": [{"name": "Alice", "months": 4.96438, "strength": 2}]}
//! ```
//!
//! Entries follow the board's insertion order. Identity keys are not written,
//! so a report cannot be joined back to channel IDs.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Result, ScoreError};
use crate::scoring::{ScoreBoard, UserRecord};

/// One exported record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub name: String,
    pub months: f64,
    pub strength: u64,
}

impl From<&UserRecord> for ReportEntry {
    fn from(record: &UserRecord) -> Self {
        Self {
            name: record.name().to_string(),
            months: record.months(),
            strength: record.strength(),
        }
    }
}

/// The exported document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub subs: Vec<ReportEntry>,
}

impl Report {
    pub fn from_board(board: &ScoreBoard) -> Self {
        Self {
            subs: board.records().map(ReportEntry::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Writes reports to a fixed path, replacing any previous report.
#[derive(Debug, Clone)]
pub struct Exporter {
    path: PathBuf,
}

impl Exporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render `report` and replace the output file with it.
    ///
    /// The document is written to a temporary file next to the target and
    /// then renamed over it, so readers never observe a partial report.
    pub fn write(&self, report: &Report) -> Result<()> {
        let json = report.to_json()?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged =
            NamedTempFile::new_in(dir).map_err(|e| ScoreError::from(e).at_path(dir))?;
        staged
            .write_all(json.as_bytes())
            .and_then(|_| staged.flush())
            .map_err(|e| ScoreError::from(e).at_path(staged.path()))?;
        staged
            .persist(&self.path)
            .map_err(|e| ScoreError::from(e).at_path(&self.path))?;

        info!(
            path = %self.path.display(),
            entries = report.subs.len(),
            bytes = json.len(),
            "Wrote report"
        );
        Ok(())
    }

    /// Build the report for `board` and write it.
    pub fn export(&self, board: &ScoreBoard) -> Result<Report> {
        let report = Report::from_board(board);
        self.write(&report)?;
        Ok(report)
    }
}
