//! Score Aggregation
//!
//! - **`clock`**: Source of the per-pass reference instant.
//! - **`aggregate`**: `UserRecord`, `ScoreBoard`, and the elapsed-months metric.

pub mod aggregate;
pub mod clock;

pub use aggregate::*;
pub use clock::*;
