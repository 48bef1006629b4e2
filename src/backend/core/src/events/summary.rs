//! Read-only overview of a log, for validating inputs before a run.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::event::{EventKind, LogRole, TimestampFormat};
use super::reader::EventReader;
use crate::error::Result;

/// Counts gathered from one full pass over a log.
#[derive(Debug, Clone, Serialize)]
pub struct LogSummary {
    pub role: LogRole,
    pub source: PathBuf,
    pub rows: u64,
    pub distinct_names: usize,
    pub by_kind: BTreeMap<EventKind, u64>,
    pub by_format: BTreeMap<TimestampFormat, u64>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

impl LogSummary {
    /// Read the whole log. Fails on the same errors a scoring run would.
    pub fn collect(reader: &EventReader) -> Result<Self> {
        let mut summary = Self {
            role: reader.role(),
            source: reader.source().label().to_path_buf(),
            rows: 0,
            distinct_names: 0,
            by_kind: BTreeMap::new(),
            by_format: BTreeMap::new(),
            earliest: None,
            latest: None,
        };
        let mut names = HashSet::new();

        for event in reader.events()? {
            let event = event?;
            summary.rows += 1;
            *summary.by_kind.entry(event.kind()).or_default() += 1;
            *summary.by_format.entry(event.timestamp_format()).or_default() += 1;

            let ts = event.timestamp();
            summary.earliest = Some(summary.earliest.map_or(ts, |e| e.min(ts)));
            summary.latest = Some(summary.latest.map_or(ts, |l| l.max(ts)));

            if !names.contains(event.user_name()) {
                names.insert(event.user_name().to_string());
            }
        }

        summary.distinct_names = names.len();
        Ok(summary)
    }
}
