//! Interaction events and timestamp handling.
//!
//! Both logs share the same four-column shape: `Type,UserId,UserName,Time`.
//! Timestamps are ISO-8601 UTC with a `Z` suffix, with or without fractional
//! seconds. Parsing tries the fractional form first and falls back to whole
//! seconds; the form that matched is kept so rows can be written back verbatim.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ScoreError};

// =============================================================================
// Event Kind
// =============================================================================

/// What produced an interaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A channel subscription.
    Subscriber,
    /// A top-level comment or a reply.
    Comment,
    /// A hand-maintained entry from the manual log.
    Manual,
}

impl EventKind {
    /// Label used in the `Type` column.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Subscriber => "subscriber",
            Self::Comment => "comment",
            Self::Manual => "manual",
        }
    }

    /// Parse a `Type` column value. Matching ignores case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "subscriber" => Some(Self::Subscriber),
            "comment" => Some(Self::Comment),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which log a reader is consuming. Drives how the `Type` and `UserId` columns
/// are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRole {
    /// The collector's log: `Type` and `UserId` are authoritative.
    Primary,
    /// The curated log: only `UserName` and `Time` are used.
    Manual,
}

impl fmt::Display for LogRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

// =============================================================================
// Timestamps
// =============================================================================

const FRACTIONAL_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const WHOLE_SECONDS_PATTERN: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The accepted timestamp layouts, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `2023-01-01T00:00:00.123Z`
    Fractional,
    /// `2023-01-01T00:00:00Z`
    WholeSeconds,
}

impl TimestampFormat {
    pub const ATTEMPT_ORDER: [TimestampFormat; 2] = [Self::Fractional, Self::WholeSeconds];

    /// strftime pattern for this layout.
    pub const fn pattern(&self) -> &'static str {
        match self {
            Self::Fractional => FRACTIONAL_PATTERN,
            Self::WholeSeconds => WHOLE_SECONDS_PATTERN,
        }
    }

    /// Attempt to parse `raw` in exactly this layout.
    pub fn try_parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        // `%.f` also matches an absent fraction, so require the dot here to
        // keep the two layouts disjoint.
        if *self == Self::Fractional && !raw.contains('.') {
            return None;
        }
        NaiveDateTime::parse_from_str(raw, self.pattern())
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Render an instant in this layout.
    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        instant.format(self.pattern()).to_string()
    }
}

/// A successfully parsed timestamp, tagged with the layout that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub instant: DateTime<Utc>,
    pub format: TimestampFormat,
}

/// Parse an interaction timestamp, trying each accepted layout in turn.
///
/// # Errors
///
/// Returns `MalformedTimestamp` if no layout matches.
pub fn parse_timestamp(raw: &str) -> Result<ParsedTimestamp> {
    let trimmed = raw.trim();
    TimestampFormat::ATTEMPT_ORDER
        .iter()
        .find_map(|format| {
            format.try_parse(trimmed).map(|instant| ParsedTimestamp {
                instant,
                format: *format,
            })
        })
        .ok_or_else(|| ScoreError::malformed_timestamp(raw))
}

// =============================================================================
// Interaction Event
// =============================================================================

/// One row of an interaction log. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    kind: EventKind,
    user_id: Option<String>,
    user_name: String,
    timestamp: DateTime<Utc>,
    timestamp_format: TimestampFormat,
}

impl InteractionEvent {
    pub fn new(
        kind: EventKind,
        user_id: Option<String>,
        user_name: impl Into<String>,
        timestamp: ParsedTimestamp,
    ) -> Self {
        Self {
            kind,
            user_id,
            user_name: user_name.into(),
            timestamp: timestamp.instant,
            timestamp_format: timestamp.format,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Channel ID of the actor. Always `None` for manual entries.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn timestamp_format(&self) -> TimestampFormat {
        self.timestamp_format
    }

    /// The timestamp rendered in the layout it was read with.
    pub fn timestamp_text(&self) -> String {
        self.timestamp_format.format(&self.timestamp)
    }
}
