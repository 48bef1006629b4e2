//! Property tests for aggregation invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use subscore_core::events::{EventKind, InteractionEvent, ParsedTimestamp, TimestampFormat};
use subscore_core::identity::IdentityKey;
use subscore_core::scoring::{elapsed_months, ScoreBoard};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn event(person: u8, seconds_ago: i64) -> (IdentityKey, InteractionEvent) {
    let id = format!("UC{person}");
    let ts = ParsedTimestamp {
        instant: now() - Duration::seconds(seconds_ago),
        format: TimestampFormat::WholeSeconds,
    };
    (
        IdentityKey::new(id.clone()),
        InteractionEvent::new(EventKind::Comment, Some(id), format!("user {person}"), ts),
    )
}

fn fold_all(rows: &[(u8, i64)]) -> ScoreBoard {
    let mut board = ScoreBoard::new();
    for &(person, ago) in rows {
        let (key, event) = event(person, ago);
        board.fold(key, &event, now());
    }
    board
}

fn arb_rows() -> impl Strategy<Value = Vec<(u8, i64)>> {
    prop::collection::vec((0u8..6, 0i64..200_000_000), 1..60)
}

proptest! {
    #[test]
    fn strength_counts_events_per_identity(rows in arb_rows()) {
        let board = fold_all(&rows);
        for (key, record) in board.iter() {
            let expected = rows
                .iter()
                .filter(|(person, _)| key.as_str() == format!("UC{person}"))
                .count() as u64;
            prop_assert_eq!(record.strength(), expected);
        }
        prop_assert_eq!(board.total_interactions(), rows.len() as u64);
    }

    #[test]
    fn months_is_max_elapsed(rows in arb_rows()) {
        let board = fold_all(&rows);
        for (key, record) in board.iter() {
            let expected = rows
                .iter()
                .filter(|(person, _)| key.as_str() == format!("UC{person}"))
                .map(|&(_, ago)| elapsed_months(now(), now() - Duration::seconds(ago)))
                .fold(0.0f64, f64::max);
            prop_assert_eq!(record.months(), expected);
        }
    }

    #[test]
    fn fold_order_does_not_change_scores(rows in arb_rows()) {
        let forward = fold_all(&rows);
        let mut reversed_rows = rows.clone();
        reversed_rows.reverse();
        let reversed = fold_all(&reversed_rows);

        prop_assert_eq!(forward.len(), reversed.len());
        for (key, record) in forward.iter() {
            let other = reversed.get(key).unwrap();
            prop_assert_eq!(record.strength(), other.strength());
            prop_assert_eq!(record.months(), other.months());
        }
    }

    #[test]
    fn months_never_negative(ago in -100_000_000i64..100_000_000) {
        let months = elapsed_months(now(), now() - Duration::seconds(ago));
        prop_assert!(months >= 0.0);
    }
}
