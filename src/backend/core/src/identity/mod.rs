//! Identity Resolution
//!
//! Groups interactions that belong to the same person across both logs.
//!
//! The primary log carries a channel ID for every row; that ID is the identity
//! key and is recorded against the row's display name. Manual-log rows carry
//! only a name: if the name was seen in the primary log the existing key is
//! reused, otherwise a fresh key is minted and remembered for the rest of the
//! run.
//!
//! Minted keys are not stable across runs. With the default [`RandomKeyMinter`]
//! the same manual-only person gets a different key every time the pipeline
//! runs. Keys never reach the exported report, so this only matters to callers
//! that inspect the [`ScoreBoard`](crate::scoring::ScoreBoard) directly.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::events::{EventKind, InteractionEvent};

// =============================================================================
// Identity Key
// =============================================================================

/// Opaque key grouping the events of one person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

// =============================================================================
// Key Minting
// =============================================================================

/// Source of fresh keys for names with no primary-log identity.
pub trait KeyMinter {
    /// Produce a key that has not been handed out before in this process.
    fn mint(&mut self, user_name: &str) -> IdentityKey;
}

/// Mints `manual-<uuid v4>` keys. Different on every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeyMinter;

impl KeyMinter for RandomKeyMinter {
    fn mint(&mut self, _user_name: &str) -> IdentityKey {
        IdentityKey(format!("manual-{}", Uuid::new_v4()))
    }
}

/// Mints `manual-1`, `manual-2`, ... Deterministic, for tests and reproducible runs.
#[derive(Debug, Clone, Default)]
pub struct SequentialKeyMinter {
    next: u64,
}

impl KeyMinter for SequentialKeyMinter {
    fn mint(&mut self, _user_name: &str) -> IdentityKey {
        self.next += 1;
        IdentityKey(format!("manual-{}", self.next))
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// How a key was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Taken from the row's own user ID.
    Authoritative,
    /// Reused from an earlier row with the same name.
    Matched,
    /// Freshly minted for an unseen name.
    Minted,
}

/// Name → key table for one run.
#[derive(Debug, Default)]
pub struct IdentityResolver<M = RandomKeyMinter> {
    by_name: HashMap<String, IdentityKey>,
    minter: M,
}

impl IdentityResolver<RandomKeyMinter> {
    pub fn new() -> Self {
        Self::with_minter(RandomKeyMinter)
    }
}

impl<M: KeyMinter> IdentityResolver<M> {
    pub fn with_minter(minter: M) -> Self {
        Self {
            by_name: HashMap::new(),
            minter,
        }
    }

    /// Record a primary-log identity under its display name and return it.
    ///
    /// A later row with the same name but a different ID replaces the mapping.
    pub fn observe_primary(&mut self, user_name: &str, user_id: &str) -> IdentityKey {
        let key = IdentityKey::new(user_id);
        if let Some(previous) = self.by_name.insert(user_name.to_string(), key.clone()) {
            if previous != key {
                debug!(
                    user_name,
                    previous = %previous,
                    current = %key,
                    "Display name moved to a different channel ID"
                );
            }
        }
        key
    }

    /// Resolve a name with no authoritative ID, minting a key if unseen.
    pub fn resolve_by_name(&mut self, user_name: &str) -> (IdentityKey, Resolution) {
        if let Some(key) = self.by_name.get(user_name) {
            return (key.clone(), Resolution::Matched);
        }
        let key = self.minter.mint(user_name);
        debug!(user_name, key = %key, "Minted identity for unmatched name");
        self.by_name.insert(user_name.to_string(), key.clone());
        (key, Resolution::Minted)
    }

    /// Resolve the identity for an event.
    ///
    /// Manual entries reconcile by name only. Primary entries use their user ID
    /// when present and fall back to name reconciliation otherwise.
    pub fn resolve(&mut self, event: &InteractionEvent) -> (IdentityKey, Resolution) {
        match (event.kind(), event.user_id()) {
            (EventKind::Manual, _) | (_, None) => self.resolve_by_name(event.user_name()),
            (_, Some(user_id)) => (
                self.observe_primary(event.user_name(), user_id),
                Resolution::Authoritative,
            ),
        }
    }

    /// Key currently mapped to a name, if any.
    pub fn lookup(&self, user_name: &str) -> Option<&IdentityKey> {
        self.by_name.get(user_name)
    }

    /// Number of distinct names seen.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::parse_timestamp;

    fn manual(name: &str) -> InteractionEvent {
        InteractionEvent::new(
            EventKind::Manual,
            None,
            name,
            parse_timestamp("2022-01-01T00:00:00Z").unwrap(),
        )
    }

    fn comment(id: &str, name: &str) -> InteractionEvent {
        InteractionEvent::new(
            EventKind::Comment,
            Some(id.to_string()),
            name,
            parse_timestamp("2023-01-01T00:00:00Z").unwrap(),
        )
    }

    #[test]
    fn test_primary_id_is_authoritative() {
        let mut resolver = IdentityResolver::with_minter(SequentialKeyMinter::default());
        let (key, how) = resolver.resolve(&comment("A1", "Alice"));
        assert_eq!(key, IdentityKey::from("A1"));
        assert_eq!(how, Resolution::Authoritative);
        assert_eq!(resolver.lookup("Alice"), Some(&IdentityKey::from("A1")));
    }

    #[test]
    fn test_manual_reuses_primary_identity() {
        let mut resolver = IdentityResolver::with_minter(SequentialKeyMinter::default());
        resolver.resolve(&comment("A1", "Alice"));

        let (key, how) = resolver.resolve(&manual("Alice"));
        assert_eq!(key.as_str(), "A1");
        assert_eq!(how, Resolution::Matched);
    }

    #[test]
    fn test_unmatched_manual_name_is_minted_once() {
        let mut resolver = IdentityResolver::with_minter(SequentialKeyMinter::default());

        let (first, how) = resolver.resolve(&manual("Carol"));
        assert_eq!(first.as_str(), "manual-1");
        assert_eq!(how, Resolution::Minted);

        let (second, how) = resolver.resolve(&manual("Carol"));
        assert_eq!(second, first);
        assert_eq!(how, Resolution::Matched);
    }

    #[test]
    fn test_name_matching_is_exact() {
        let mut resolver = IdentityResolver::with_minter(SequentialKeyMinter::default());
        resolver.resolve(&comment("A1", "Alice"));

        let (key, how) = resolver.resolve(&manual("alice"));
        assert_ne!(key.as_str(), "A1");
        assert_eq!(how, Resolution::Minted);
    }

    #[test]
    fn test_last_primary_id_wins_for_a_name() {
        let mut resolver = IdentityResolver::with_minter(SequentialKeyMinter::default());
        resolver.resolve(&comment("A1", "Sam"));
        resolver.resolve(&comment("A2", "Sam"));

        assert_eq!(resolver.resolve(&manual("Sam")).0.as_str(), "A2");
    }

    #[test]
    fn test_blank_id_before_authoritative_row_stays_separate() {
        let mut resolver = IdentityResolver::with_minter(SequentialKeyMinter::default());
        let blank = InteractionEvent::new(
            EventKind::Comment,
            None,
            "Alice",
            parse_timestamp("2023-01-01T00:00:00Z").unwrap(),
        );

        let (early, how) = resolver.resolve(&blank);
        assert_eq!(early.as_str(), "manual-1");
        assert_eq!(how, Resolution::Minted);

        let (late, _) = resolver.resolve(&comment("A1", "Alice"));
        assert_eq!(late.as_str(), "A1");
        assert_ne!(early, late);

        // The name now points at the channel ID for every later row.
        assert_eq!(resolver.resolve(&manual("Alice")).0, late);
    }

    #[test]
    fn test_random_minter_keys_are_unique() {
        let mut resolver = IdentityResolver::new();
        let (a, _) = resolver.resolve(&manual("Carol"));
        let (b, _) = resolver.resolve(&manual("Dave"));
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("manual-"));
    }
}
