//! Error handling for Subscore Core.
//!
//! This module provides:
//! - Machine-readable error codes with numeric values and categories
//! - Severity levels that drive how errors are logged
//! - A single error type carrying source location (file, line, raw value)
//! - An extension trait for attaching context to foreign errors
//!
//! Every error in this crate is fatal to the run: there is no retry policy and
//! no partial report is ever written.
//!
//! # Usage
//!
//! ```rust,ignore
//! use subscore_core::error::{ErrorCode, ErrorContext, Result};
//!
//! fn load() -> Result<String> {
//!     std::fs::read_to_string("results.csv").with_error_code(ErrorCode::MissingInputFile)
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for Subscore operations.
pub type Result<T> = std::result::Result<T, ScoreError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input Errors (1000-1099)
    MissingInputFile,
    MalformedTimestamp,
    MalformedRow,
    CsvError,

    // Output Errors (2000-2099)
    IoError,
    SerializationError,

    // Configuration Errors (5000-5099)
    ConfigurationError,

    // Internal Errors (9000-9099)
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::MissingInputFile => 1000,
            Self::MalformedTimestamp => 1001,
            Self::MalformedRow => 1002,
            Self::CsvError => 1003,

            Self::IoError => 2000,
            Self::SerializationError => 2001,

            Self::ConfigurationError => 5000,

            Self::InternalError => 9000,
        }
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            1000..=1099 => "input",
            2000..=2099 => "output",
            5000..=5099 => "configuration",
            9000..=9099 => "internal",
            _ => "unknown",
        }
    }

    /// Process exit status used by the binaries for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MissingInputFile => 66,
            Self::MalformedTimestamp | Self::MalformedRow | Self::CsvError => 65,
            Self::IoError | Self::SerializationError => 74,
            Self::ConfigurationError => 78,
            Self::InternalError => 70,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (affects logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Bad input data supplied by the user
    Low,
    /// Environment problems (missing files, bad configuration)
    Medium,
    /// Failures writing output
    High,
    /// Bugs
    Critical,
}

impl ErrorSeverity {
    /// Get severity based on error code.
    pub const fn from_code(code: &ErrorCode) -> Self {
        match code {
            ErrorCode::MalformedTimestamp | ErrorCode::MalformedRow | ErrorCode::CsvError => {
                Self::Low
            }
            ErrorCode::MissingInputFile | ErrorCode::ConfigurationError => Self::Medium,
            ErrorCode::IoError | ErrorCode::SerializationError => Self::High,
            ErrorCode::InternalError => Self::Critical,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Details
// ═══════════════════════════════════════════════════════════════════════════════

/// Where in the input an error was found.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// File (or in-memory source label) being processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// 1-based line number within the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,

    /// Offending raw value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ErrorDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.path.is_none() && self.line.is_none() && self.value.is_none()
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(path) = &self.path {
            parts.push(match self.line {
                Some(line) => format!("{}:{}", path.display(), line),
                None => path.display().to_string(),
            });
        } else if let Some(line) = self.line {
            parts.push(format!("line {}", line));
        }
        if let Some(value) = &self.value {
            parts.push(format!("value {:?}", value));
        }
        write!(f, "{}", parts.join(", "))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The main error type for Subscore Core.
#[derive(Error, Debug)]
pub struct ScoreError {
    /// Machine-readable error code
    code: ErrorCode,

    /// Human-readable message
    message: Cow<'static, str>,

    /// Location of the offending input
    details: ErrorDetails,

    /// The source error that caused this error
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.details.is_empty() {
            write!(f, " ({})", self.details)?;
        }
        Ok(())
    }
}

impl ScoreError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and message.
    pub fn new(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            details: ErrorDetails::default(),
            source: None,
        }
    }

    /// An input log does not exist.
    pub fn missing_input(path: impl AsRef<Path>) -> Self {
        Self::new(ErrorCode::MissingInputFile, "Input log not found")
            .with_details(ErrorDetails::new().with_path(path))
    }

    /// A timestamp matched none of the accepted formats.
    pub fn malformed_timestamp(raw: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MalformedTimestamp,
            "Timestamp is not ISO-8601 UTC (expected YYYY-MM-DDTHH:MM:SS[.ffffff]Z)",
        )
        .with_details(ErrorDetails::new().with_value(raw))
    }

    /// A row could not be interpreted as an interaction.
    pub fn malformed_row(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::MalformedRow, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Replace error details.
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = details;
        self
    }

    /// Attach the source path, keeping any line/value already recorded.
    pub fn at_path(mut self, path: impl AsRef<Path>) -> Self {
        self.details.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Attach the 1-based line number.
    pub fn at_line(mut self, line: u64) -> Self {
        self.details.line = Some(line);
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the error details.
    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log this error with appropriate severity.
    pub fn log(&self) {
        let code = self.code.to_string();
        let category = self.code.category();

        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::High => {
                error!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    details = %self.details,
                    source = ?self.source,
                    "Run failed"
                );
            }
            ErrorSeverity::Medium | ErrorSeverity::Low => {
                warn!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    details = %self.details,
                    "Run aborted"
                );
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Context Extension Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Wrap the error as an internal error with a message.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Wrap the error under a specific error code.
    fn with_error_code(self, code: ErrorCode) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| ScoreError::internal(message.into()).with_source(e))
    }

    fn with_error_code(self, code: ErrorCode) -> Result<T> {
        self.map_err(|e| ScoreError::new(code, e.to_string()).with_source(e))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// From Implementations for Common Error Types
// ═══════════════════════════════════════════════════════════════════════════════

impl From<std::io::Error> for ScoreError {
    fn from(error: std::io::Error) -> Self {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::MissingInputFile,
            _ => ErrorCode::IoError,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

impl From<csv::Error> for ScoreError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());
        let code = match error.kind() {
            csv::ErrorKind::UnequalLengths { .. } => ErrorCode::MalformedRow,
            csv::ErrorKind::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ErrorCode::MissingInputFile
            }
            _ => ErrorCode::CsvError,
        };
        let mut err = Self::new(code, error.to_string());
        if let Some(line) = line {
            err = err.at_line(line);
        }
        err.with_source(error)
    }
}

impl From<serde_json::Error> for ScoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, "Failed to render report").with_source(error)
    }
}

impl From<tempfile::PersistError> for ScoreError {
    fn from(error: tempfile::PersistError) -> Self {
        Self::new(ErrorCode::IoError, "Failed to replace report file").with_source(error)
    }
}

impl From<config::ConfigError> for ScoreError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string()).with_source(error)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
