//! Interaction Logs
//!
//! This module covers everything that touches the CSV interaction logs:
//!
//! - **`event`**: The `InteractionEvent` model, event kinds, and timestamp parsing.
//! - **`reader`**: `EventReader`, a restartable, lazy reader over one log.
//! - **`writer`**: `EventLogWriter`, which appends rows in the collector's format.
//! - **`summary`**: `LogSummary`, row counts for checking a log without scoring it.

pub mod event;
pub mod reader;
pub mod summary;
pub mod writer;

pub use event::*;
pub use reader::*;
pub use summary::*;
pub use writer::*;
