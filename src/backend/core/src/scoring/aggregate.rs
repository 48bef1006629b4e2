//! Per-identity engagement records.
//!
//! A [`ScoreBoard`] is folded over the events of each log. Every identity gets
//! one [`UserRecord`] holding:
//!
//! - `strength`: how many interactions were folded into it;
//! - `months`: elapsed months since its *earliest* interaction, i.e. the
//!   maximum elapsed value over all folded events.
//!
//! Both fields only ever grow, so the result does not depend on fold order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::events::InteractionEvent;
use crate::identity::IdentityKey;

/// Length of the synthetic "month" unit (30.42 days).
pub const SECONDS_PER_MONTH: f64 = 2_628_000.0;

/// Decimal digits kept in the months metric.
pub const MONTHS_PRECISION: i32 = 5;

/// Elapsed months between `timestamp` and `now`, rounded to five decimals.
///
/// Timestamps after `now` yield `0.0`.
pub fn elapsed_months(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> f64 {
    let delta = now - timestamp;
    let seconds = match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    };
    round_to((seconds / SECONDS_PER_MONTH).max(0.0), MONTHS_PRECISION)
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

// =============================================================================
// User Record
// =============================================================================

/// Aggregated engagement for one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    name: String,
    months: f64,
    strength: u64,
}

impl UserRecord {
    /// Record for a first interaction.
    pub fn first(name: impl Into<String>, months: f64) -> Self {
        Self {
            name: name.into(),
            months,
            strength: 1,
        }
    }

    /// Display name taken from the identity's first folded event.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Months since the earliest interaction.
    pub fn months(&self) -> f64 {
        self.months
    }

    /// Number of interactions.
    pub fn strength(&self) -> u64 {
        self.strength
    }

    /// Fold one more interaction with the given elapsed months.
    pub fn observe(&mut self, months: f64) {
        self.strength += 1;
        if months > self.months {
            self.months = months;
        }
    }
}

// =============================================================================
// Score Board
// =============================================================================

/// What a fold did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldOutcome {
    Created,
    Updated,
}

/// Insertion-ordered map from identity to record.
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    entries: Vec<(IdentityKey, UserRecord)>,
    index: HashMap<IdentityKey, usize>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the record for `key`, scoring it against `now`.
    pub fn fold(
        &mut self,
        key: IdentityKey,
        event: &InteractionEvent,
        now: DateTime<Utc>,
    ) -> FoldOutcome {
        if event.timestamp() > now {
            warn!(
                key = %key,
                timestamp = %event.timestamp(),
                now = %now,
                "Interaction is later than the reference instant, scoring as 0 months"
            );
        }
        let months = elapsed_months(now, event.timestamp());

        match self.index.get(&key) {
            Some(&slot) => {
                let record = &mut self.entries[slot].1;
                record.observe(months);
                trace!(key = %key, months, strength = record.strength, "Updated record");
                FoldOutcome::Updated
            }
            None => {
                trace!(key = %key, months, "Created record");
                self.index.insert(key.clone(), self.entries.len());
                self.entries
                    .push((key, UserRecord::first(event.user_name(), months)));
                FoldOutcome::Created
            }
        }
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&UserRecord> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.index.contains_key(key)
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of strengths across all records.
    pub fn total_interactions(&self) -> u64 {
        self.entries.iter().map(|(_, r)| r.strength).sum()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, &UserRecord)> {
        self.entries.iter().map(|(k, r)| (k, r))
    }

    /// Records in insertion order, keys dropped.
    pub fn records(&self) -> impl Iterator<Item = &UserRecord> {
        self.entries.iter().map(|(_, r)| r)
    }
}

/// Functional form of [`ScoreBoard::fold`].
pub fn fold(
    mut board: ScoreBoard,
    key: IdentityKey,
    event: &InteractionEvent,
    now: DateTime<Utc>,
) -> ScoreBoard {
    board.fold(key, event, now);
    board
}
