//! Lazy, restartable reader over one interaction log.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord};
use tracing::{trace, warn};

use super::event::{parse_timestamp, EventKind, InteractionEvent, LogRole};
use crate::error::{Result, ScoreError};

/// Number of columns every row must carry.
pub const REQUIRED_COLUMNS: usize = 4;

/// Where a log's bytes come from.
#[derive(Debug, Clone)]
pub enum LogSource {
    /// A CSV file on disk, opened fresh on every pass.
    File(PathBuf),
    /// An in-memory document, labelled for error messages.
    Memory { label: PathBuf, contents: Arc<str> },
}

impl LogSource {
    /// Path (or label) used in logs and error details.
    pub fn label(&self) -> &Path {
        match self {
            Self::File(path) => path,
            Self::Memory { label, .. } => label,
        }
    }

    fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            Self::File(path) => match File::open(path) {
                Ok(file) => Ok(Box::new(file)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    Err(ScoreError::missing_input(path).with_source(e))
                }
                Err(e) => Err(ScoreError::from(e).at_path(path)),
            },
            Self::Memory { contents, .. } => {
                Ok(Box::new(io::Cursor::new(contents.as_bytes().to_vec())))
            }
        }
    }
}

/// Reads one CSV log into [`InteractionEvent`]s.
///
/// Construction does no I/O. Each call to [`EventReader::events`] opens the
/// source again and starts from the first data row, so a reader can be
/// iterated any number of times.
#[derive(Debug, Clone)]
pub struct EventReader {
    source: LogSource,
    role: LogRole,
}

impl EventReader {
    /// Reader over a file on disk.
    pub fn open(path: impl Into<PathBuf>, role: LogRole) -> Self {
        Self {
            source: LogSource::File(path.into()),
            role,
        }
    }

    /// Reader over an in-memory CSV document.
    pub fn from_string(
        label: impl Into<PathBuf>,
        contents: impl Into<Arc<str>>,
        role: LogRole,
    ) -> Self {
        Self {
            source: LogSource::Memory {
                label: label.into(),
                contents: contents.into(),
            },
            role,
        }
    }

    pub fn role(&self) -> LogRole {
        self.role
    }

    pub fn source(&self) -> &LogSource {
        &self.source
    }

    /// Start a fresh pass over the log.
    ///
    /// The header row is consumed here and its column names are not checked.
    ///
    /// # Errors
    ///
    /// `MissingInputFile` if the file does not exist, `MalformedRow` if the log
    /// has no header row.
    pub fn events(&self) -> Result<Events> {
        let label = self.source.label().to_path_buf();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(self.source.open()?);

        let header = reader
            .headers()
            .map_err(|e| ScoreError::from(e).at_path(&label))?;
        if header.is_empty() {
            return Err(ScoreError::malformed_row("Log has no header row")
                .at_path(&label)
                .at_line(1));
        }

        Ok(Events {
            reader,
            record: StringRecord::new(),
            role: self.role,
            origin: label,
            finished: false,
        })
    }

    /// Read the whole log, stopping at the first error.
    pub fn read_all(&self) -> Result<Vec<InteractionEvent>> {
        self.events()?.collect()
    }
}

/// Iterator over the data rows of one pass. Stops after the first error.
pub struct Events {
    reader: csv::Reader<Box<dyn Read>>,
    record: StringRecord,
    role: LogRole,
    origin: PathBuf,
    finished: bool,
}

impl Events {
    fn next_event(&mut self) -> Result<Option<InteractionEvent>> {
        let more = self
            .reader
            .read_record(&mut self.record)
            .map_err(|e| ScoreError::from(e).at_path(&self.origin))?;
        if !more {
            return Ok(None);
        }

        let line = self.record.position().map(|p| p.line()).unwrap_or_default();
        parse_row(&self.record, self.role)
            .map(Some)
            .map_err(|e| e.at_path(&self.origin).at_line(line))
    }
}

impl Iterator for Events {
    type Item = Result<InteractionEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Events {}

/// Interpret one CSV record according to the log's role.
fn parse_row(record: &StringRecord, role: LogRole) -> Result<InteractionEvent> {
    if record.len() < REQUIRED_COLUMNS {
        return Err(ScoreError::malformed_row(format!(
            "Expected {} columns, found {}",
            REQUIRED_COLUMNS,
            record.len()
        )));
    }

    let kind_label = &record[0];
    let user_id = &record[1];
    let user_name = &record[2];
    let timestamp = parse_timestamp(&record[3])?;

    let event = match role {
        LogRole::Primary => {
            let kind = match EventKind::from_label(kind_label) {
                Some(EventKind::Subscriber) => EventKind::Subscriber,
                Some(_) => EventKind::Comment,
                None => {
                    warn!(label = kind_label, "Unrecognised interaction type, counting as comment");
                    EventKind::Comment
                }
            };
            let user_id = Some(user_id.trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string);
            InteractionEvent::new(kind, user_id, user_name, timestamp)
        }
        LogRole::Manual => InteractionEvent::new(EventKind::Manual, None, user_name, timestamp),
    };

    trace!(
        kind = %event.kind(),
        user_name = event.user_name(),
        timestamp = %event.timestamp(),
        "Parsed interaction"
    );
    Ok(event)
}
