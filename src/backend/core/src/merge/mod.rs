//! Merge Engine
//!
//! Scores the primary log, then folds the manual log on top of it:
//!
//! 1. Primary pass: every row is keyed by its channel ID, and each display name
//!    is recorded against that ID.
//! 2. Manual pass: every row is keyed by name only. Names seen in the primary
//!    log fold into the existing record; unseen names get a minted identity.
//!
//! Each pass captures its own reference instant from the [`Clock`], so the two
//! passes of a wall-clock run may differ by the time the first pass took.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::events::{EventReader, Events, LogRole};
use crate::identity::{IdentityResolver, KeyMinter, RandomKeyMinter, Resolution};
use crate::scoring::{Clock, FoldOutcome, ScoreBoard, SystemClock};

/// Counters for one pass over a log.
#[derive(Debug, Clone, Serialize)]
pub struct PassStats {
    pub role: LogRole,
    /// Reference instant the pass scored against
    pub now: DateTime<Utc>,
    /// Rows folded
    pub events: u64,
    /// Records created by this pass
    pub new_records: u64,
    /// Rows reconciled to an existing identity by name
    pub matched_by_name: u64,
    /// Identities minted for unseen names
    pub minted: u64,
}

impl PassStats {
    fn new(role: LogRole, now: DateTime<Utc>) -> Self {
        Self {
            role,
            now,
            events: 0,
            new_records: 0,
            matched_by_name: 0,
            minted: 0,
        }
    }
}

/// Result of a complete merge.
#[derive(Debug)]
pub struct MergeOutcome {
    pub board: ScoreBoard,
    pub primary: PassStats,
    pub manual: PassStats,
}

/// Runs both passes against one shared board and identity table.
pub struct MergeEngine<C = SystemClock, M = RandomKeyMinter> {
    clock: C,
    resolver: IdentityResolver<M>,
}

impl MergeEngine<SystemClock, RandomKeyMinter> {
    /// Engine scoring against wall-clock time with random manual identities.
    pub fn new() -> Self {
        Self::with_parts(SystemClock, RandomKeyMinter)
    }
}

impl Default for MergeEngine<SystemClock, RandomKeyMinter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, M: KeyMinter> MergeEngine<C, M> {
    pub fn with_parts(clock: C, minter: M) -> Self {
        Self {
            clock,
            resolver: IdentityResolver::with_minter(minter),
        }
    }

    /// Score `primary`, then merge `manual` into the result.
    ///
    /// Both logs are opened before anything is folded, so a missing file is
    /// reported without doing any work.
    ///
    /// # Errors
    ///
    /// The first error from either log. The partially folded board is dropped.
    pub fn run(mut self, primary: &EventReader, manual: &EventReader) -> Result<MergeOutcome> {
        let primary_events = primary.events()?;
        let manual_events = manual.events()?;

        let mut board = ScoreBoard::new();
        let primary_stats = self.pass(&mut board, primary_events, LogRole::Primary)?;
        let manual_stats = self.pass(&mut board, manual_events, LogRole::Manual)?;

        info!(
            identities = board.len(),
            interactions = board.total_interactions(),
            manual_matched = manual_stats.matched_by_name,
            manual_minted = manual_stats.minted,
            "Merged interaction logs"
        );

        Ok(MergeOutcome {
            board,
            primary: primary_stats,
            manual: manual_stats,
        })
    }

    /// Fold every row of one log into `board`.
    #[instrument(skip_all, fields(role = %role))]
    fn pass(&mut self, board: &mut ScoreBoard, events: Events, role: LogRole) -> Result<PassStats> {
        let now = self.clock.now();
        let mut stats = PassStats::new(role, now);

        for event in events {
            let event = event?;
            let (key, resolution) = match role {
                LogRole::Primary => self.resolver.resolve(&event),
                LogRole::Manual => self.resolver.resolve_by_name(event.user_name()),
            };
            match resolution {
                Resolution::Matched => stats.matched_by_name += 1,
                Resolution::Minted => stats.minted += 1,
                Resolution::Authoritative => {}
            }
            if board.fold(key, &event, now) == FoldOutcome::Created {
                stats.new_records += 1;
            }
            stats.events += 1;
        }

        info!(
            events = stats.events,
            new_records = stats.new_records,
            now = %now,
            "Pass complete"
        );
        Ok(stats)
    }
}
