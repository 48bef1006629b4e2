//! Check command.
//!
//! Reads both logs end to end and reports what they contain. Fails on exactly
//! the inputs a scoring run would fail on, without writing anything.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use subscore_core::config::ResolvedPaths;
use subscore_core::events::{EventReader, LogRole, LogSummary};
use subscore_core::pipeline;

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct CheckArgs {
    /// Only check the primary log
    #[arg(long)]
    primary_only: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Log")]
    role: String,
    #[tabled(rename = "Rows")]
    rows: u64,
    #[tabled(rename = "People")]
    people: usize,
    #[tabled(rename = "Kinds")]
    kinds: String,
    #[tabled(rename = "Earliest")]
    earliest: String,
    #[tabled(rename = "Latest")]
    latest: String,
}

impl From<&LogSummary> for SummaryRow {
    fn from(summary: &LogSummary) -> Self {
        let kinds = summary
            .by_kind
            .iter()
            .map(|(kind, count)| format!("{}={}", kind, count))
            .collect::<Vec<_>>()
            .join(" ");
        let day = |ts: Option<chrono::DateTime<chrono::Utc>>| {
            ts.map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        Self {
            role: summary.role.to_string(),
            rows: summary.rows,
            people: summary.distinct_names,
            kinds,
            earliest: day(summary.earliest),
            latest: day(summary.latest),
        }
    }
}

pub fn execute(args: CheckArgs, paths: &ResolvedPaths, format: OutputFormat) -> Result<()> {
    let mut summaries = Vec::new();
    if args.primary_only {
        summaries.push(LogSummary::collect(&EventReader::open(
            &paths.primary_log,
            LogRole::Primary,
        ))?);
    } else {
        pipeline::check_inputs(paths)?;
        for (path, role) in [
            (&paths.primary_log, LogRole::Primary),
            (&paths.manual_log, LogRole::Manual),
        ] {
            summaries.push(LogSummary::collect(&EventReader::open(path, role))?);
        }
    }

    match format {
        OutputFormat::Table => {
            output::print_header("Interaction Logs");
            for summary in &summaries {
                output::print_detail(
                    &summary.role.to_string(),
                    &summary.source.display().to_string(),
                );
            }
            println!();
            let rows: Vec<SummaryRow> = summaries.iter().map(SummaryRow::from).collect();
            output::print_table(&rows);
            output::print_success("Logs are readable");
        }
        _ => output::print_item(&summaries, format)?,
    }
    Ok(())
}
