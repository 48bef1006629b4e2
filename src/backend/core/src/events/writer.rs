//! Appends rows to an interaction log in the collector's format.
//!
//! Rows are written with every field quoted:
//!
//! ```text
//! Type,UserId,UserName,Time
//! "subscriber","UC123","Some Channel","2023-03-01T00:00:00Z"
//! ```
//!
//! The header is written only when the file is created (or is empty); existing
//! content is never rewritten. A file saved without a trailing newline gets
//! one before the new rows.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::debug;

use super::event::InteractionEvent;
use crate::error::{Result, ScoreError};

/// Column names of both logs.
pub const LOG_HEADER: [&str; 4] = ["Type", "UserId", "UserName", "Time"];

/// Appending writer for one log file.
#[derive(Debug, Clone)]
pub struct EventLogWriter {
    path: PathBuf,
}

impl EventLogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event.
    pub fn append(&self, event: &InteractionEvent) -> Result<()> {
        self.append_all(std::slice::from_ref(event)).map(|_| ())
    }

    /// Append a batch of events, returning how many rows were written.
    pub fn append_all(&self, events: &[InteractionEvent]) -> Result<usize> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ScoreError::from(e).at_path(&self.path))?;

        let len = file
            .metadata()
            .map_err(|e| ScoreError::from(e).at_path(&self.path))?
            .len();
        let is_new = len == 0;
        if is_new {
            writeln!(file, "{}", LOG_HEADER.join(","))
                .map_err(|e| ScoreError::from(e).at_path(&self.path))?;
        } else if !ends_with_newline(&mut file, len)
            .map_err(|e| ScoreError::from(e).at_path(&self.path))?
        {
            debug!(path = %self.path.display(), "Terminating unterminated last row");
            writeln!(file).map_err(|e| ScoreError::from(e).at_path(&self.path))?;
        }

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);

        for event in events {
            writer
                .write_record([
                    event.kind().label(),
                    event.user_id().unwrap_or_default(),
                    event.user_name(),
                    event.timestamp_text().as_str(),
                ])
                .map_err(|e| ScoreError::from(e).at_path(&self.path))?;
        }
        writer
            .flush()
            .map_err(|e| ScoreError::from(e).at_path(&self.path))?;

        debug!(
            path = %self.path.display(),
            rows = events.len(),
            created = is_new,
            "Appended interaction rows"
        );
        Ok(events.len())
    }
}

/// Whether the last byte of a non-empty file is `\n`.
fn ends_with_newline(file: &mut File, len: u64) -> std::io::Result<bool> {
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
