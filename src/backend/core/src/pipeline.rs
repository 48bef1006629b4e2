//! The end-to-end scoring run: check inputs, merge both logs, export.
//!
//! The run is all-or-nothing. Both inputs are checked before any work starts,
//! and the report is only written after both passes succeed.

use tracing::{info, instrument};

use crate::config::ResolvedPaths;
use crate::error::{Result, ScoreError};
use crate::events::{EventReader, LogRole};
use crate::export::{Exporter, Report};
use crate::identity::KeyMinter;
use crate::merge::{MergeEngine, MergeOutcome};
use crate::scoring::Clock;

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Score and build the report without writing it.
    pub dry_run: bool,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: MergeOutcome,
    pub report: Report,
    /// Whether the report file was written
    pub written: bool,
}

/// Fail with `MissingInputFile` unless both logs exist.
pub fn check_inputs(paths: &ResolvedPaths) -> Result<()> {
    for path in [&paths.primary_log, &paths.manual_log] {
        if !path.is_file() {
            return Err(ScoreError::missing_input(path));
        }
    }
    Ok(())
}

/// Run the pipeline with an explicit clock and key minter.
#[instrument(skip_all, fields(primary = %paths.primary_log.display(), manual = %paths.manual_log.display()))]
pub fn run_with<C: Clock, M: KeyMinter>(
    paths: &ResolvedPaths,
    engine: MergeEngine<C, M>,
    options: RunOptions,
) -> Result<RunSummary> {
    check_inputs(paths)?;

    let primary = EventReader::open(&paths.primary_log, LogRole::Primary);
    let manual = EventReader::open(&paths.manual_log, LogRole::Manual);
    let outcome = engine.run(&primary, &manual)?;

    let report = Report::from_board(&outcome.board);
    if options.dry_run {
        info!(entries = report.subs.len(), "Dry run, report not written");
    } else {
        Exporter::new(&paths.output).write(&report)?;
    }

    Ok(RunSummary {
        outcome,
        report,
        written: !options.dry_run,
    })
}

/// Run the pipeline against wall-clock time.
pub fn run(paths: &ResolvedPaths, options: RunOptions) -> Result<RunSummary> {
    run_with(paths, MergeEngine::new(), options)
}
