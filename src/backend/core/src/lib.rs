//! # Subscore Core
//!
//! Engagement scoring for a channel's interaction logs.
//!
//! ## Architecture
//!
//! - **Events**: Reads and appends the CSV interaction logs
//! - **Identity**: Reconciles people across logs by channel ID and display name
//! - **Scoring**: Folds interactions into per-person recency and strength records
//! - **Merge**: Scores the collector's log, then merges the manual log on top
//! - **Export**: Writes the `{"subs": [...]}` report
//! - **Pipeline**: The all-or-nothing run tying the above together
//! - **Telemetry**: Structured logging

pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod identity;
pub mod merge;
pub mod pipeline;
pub mod scoring;
pub mod telemetry;

pub use error::{ErrorCode, ErrorContext, ErrorDetails, ErrorSeverity, Result, ScoreError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, PathsConfig, ResolvedPaths};
    pub use crate::error::{ErrorCode, Result, ScoreError};
    pub use crate::events::{
        parse_timestamp, EventKind, EventLogWriter, EventReader, InteractionEvent, LogRole,
        ParsedTimestamp, TimestampFormat,
    };
    pub use crate::export::{Exporter, Report, ReportEntry};
    pub use crate::identity::{
        IdentityKey, IdentityResolver, KeyMinter, RandomKeyMinter, SequentialKeyMinter,
    };
    pub use crate::merge::{MergeEngine, MergeOutcome, PassStats};
    pub use crate::pipeline::{run, run_with, RunOptions, RunSummary};
    pub use crate::scoring::{
        elapsed_months, Clock, FixedClock, ScoreBoard, SystemClock, UserRecord,
        SECONDS_PER_MONTH,
    };
}
