//! Add command.
//!
//! Appends a supporter to the manual log, creating the file (with its header)
//! when it does not exist yet.

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;

use subscore_core::config::ResolvedPaths;
use subscore_core::events::{
    parse_timestamp, EventKind, EventLogWriter, InteractionEvent, ParsedTimestamp,
    TimestampFormat,
};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct AddArgs {
    /// Display name, exactly as it appears on the channel
    #[arg(short, long)]
    name: String,

    /// Interaction time (e.g. 2023-01-01T00:00:00Z); defaults to now
    #[arg(short, long)]
    time: Option<String>,
}

#[derive(Serialize)]
struct AddedEntry<'a> {
    log: String,
    name: &'a str,
    time: String,
}

/// Build the manual-log event for the given arguments.
fn manual_event(name: &str, time: Option<&str>) -> Result<InteractionEvent> {
    let name = name.trim();
    if name.is_empty() {
        bail!("--name must not be empty");
    }
    let timestamp = match time {
        Some(raw) => parse_timestamp(raw)?,
        None => ParsedTimestamp {
            instant: Utc::now(),
            format: TimestampFormat::WholeSeconds,
        },
    };
    Ok(InteractionEvent::new(EventKind::Manual, None, name, timestamp))
}

pub fn execute(args: AddArgs, paths: &ResolvedPaths, format: OutputFormat) -> Result<()> {
    let event = manual_event(&args.name, args.time.as_deref())?;
    let writer = EventLogWriter::new(&paths.manual_log);
    writer.append(&event)?;

    match format {
        OutputFormat::Table => output::print_success(&format!(
            "Added {} ({}) to {}",
            event.user_name(),
            event.timestamp_text(),
            writer.path().display()
        )),
        _ => output::print_item(
            &AddedEntry {
                log: writer.path().display().to_string(),
                name: event.user_name(),
                time: event.timestamp_text(),
            },
            format,
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use subscore_core::events::{EventReader, LogRole};

    #[test]
    fn test_manual_event_uses_given_time() {
        let event = manual_event("  Alice ", Some("2022-01-01T00:00:00Z")).unwrap();
        assert_eq!(event.user_name(), "Alice");
        assert_eq!(event.kind(), EventKind::Manual);
        assert_eq!(event.timestamp_text(), "2022-01-01T00:00:00Z");
    }

    #[test]
    fn test_manual_event_defaults_to_whole_seconds_now() {
        let event = manual_event("Alice", None).unwrap();
        assert_eq!(event.timestamp_format(), TimestampFormat::WholeSeconds);
        assert!(parse_timestamp(&event.timestamp_text()).is_ok());
    }

    #[test]
    fn test_manual_event_rejects_bad_input() {
        assert!(manual_event("   ", None).is_err());
        assert!(manual_event("Alice", Some("last tuesday")).is_err());
    }

    #[test]
    fn test_execute_appends_to_manual_log() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ResolvedPaths {
            primary_log: dir.path().join("results.csv"),
            manual_log: dir.path().join("manual-sub-list.csv"),
            output: dir.path().join("subscribers.json"),
        };

        for name in ["Alice", "Bob"] {
            let args = AddArgs {
                name: name.to_string(),
                time: Some("2022-01-01T00:00:00Z".to_string()),
            };
            execute(args, &paths, OutputFormat::Json).unwrap();
        }

        let events = EventReader::open(&paths.manual_log, LogRole::Manual)
            .read_all()
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].user_name(), "Bob");
    }
}
