//! Telemetry: structured logging for the scoring engine.
//!
//! Logs go to stderr so that command output on stdout stays machine-readable.
//!
//! # Example
//!
//! ```rust,no_run
//! use subscore_core::telemetry::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::default()).expect("Failed to initialize logging");
//! ```

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingConfig};
