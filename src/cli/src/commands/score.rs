//! Score command.
//!
//! Runs the full pipeline and prints the resulting records.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use subscore_core::config::ResolvedPaths;
use subscore_core::export::ReportEntry;
use subscore_core::identity::RandomKeyMinter;
use subscore_core::merge::{MergeEngine, PassStats};
use subscore_core::pipeline::{self, RunOptions, RunSummary};
use subscore_core::scoring::FixedClock;

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ScoreArgs {
    /// Score against this instant (RFC 3339) instead of the current time
    #[arg(long)]
    now: Option<String>,

    /// Build the report without writing it
    #[arg(long)]
    dry_run: bool,

    /// Show only the N strongest records in table output
    #[arg(short, long)]
    top: Option<usize>,
}

#[derive(Debug, Serialize, Tabled)]
struct RecordRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Strength")]
    strength: u64,
    #[tabled(rename = "Months")]
    months: String,
}

impl From<&ReportEntry> for RecordRow {
    fn from(entry: &ReportEntry) -> Self {
        Self {
            name: entry.name.clone(),
            strength: entry.strength,
            months: format!("{:.2}", entry.months),
        }
    }
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    output: Option<String>,
    primary: &'a PassStats,
    manual: &'a PassStats,
    subs: &'a [ReportEntry],
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("--now must be an RFC 3339 timestamp, got {:?}", raw))?;
    Ok(parsed.with_timezone(&Utc))
}

pub fn execute(args: ScoreArgs, paths: &ResolvedPaths, format: OutputFormat) -> Result<()> {
    let options = RunOptions {
        dry_run: args.dry_run,
    };
    let summary = match args.now.as_deref() {
        Some(raw) => {
            let engine = MergeEngine::with_parts(FixedClock(parse_now(raw)?), RandomKeyMinter);
            pipeline::run_with(paths, engine, options)?
        }
        None => pipeline::run(paths, options)?,
    };

    match format {
        OutputFormat::Table => print_table(&summary, paths, args.top),
        _ => output::print_item(
            &ScoreOutput {
                output: summary
                    .written
                    .then(|| paths.output.display().to_string()),
                primary: &summary.outcome.primary,
                manual: &summary.outcome.manual,
                subs: &summary.report.subs,
            },
            format,
        )?,
    }
    Ok(())
}

fn print_table(summary: &RunSummary, paths: &ResolvedPaths, top: Option<usize>) {
    let primary = &summary.outcome.primary;
    let manual = &summary.outcome.manual;

    output::print_header("Scoring Summary");
    output::print_detail("Primary rows", &primary.events.to_string());
    output::print_detail("Manual rows", &manual.events.to_string());
    output::print_detail("Matched by name", &manual.matched_by_name.to_string());
    output::print_detail("Manual-only people", &manual.minted.to_string());
    output::print_detail("Records", &summary.report.subs.len().to_string());
    output::print_detail("Scored at", &primary.now.to_rfc3339());
    println!();

    // Display order only; the report keeps first-seen order.
    let mut entries: Vec<&ReportEntry> = summary.report.subs.iter().collect();
    entries.sort_by(|a, b| {
        b.strength
            .cmp(&a.strength)
            .then(b.months.total_cmp(&a.months))
            .then_with(|| a.name.cmp(&b.name))
    });
    let rows: Vec<RecordRow> = entries
        .into_iter()
        .take(top.unwrap_or(usize::MAX))
        .map(RecordRow::from)
        .collect();
    output::print_table(&rows);

    if summary.written {
        output::print_success(&format!("Report written to {}", paths.output.display()));
    } else {
        output::print_info("Dry run: report not written");
    }
}
