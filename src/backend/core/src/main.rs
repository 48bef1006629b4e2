//! score-users - single-shot scoring run.
//!
//! Reads both logs from the configured working directory, writes the report,
//! and exits non-zero without touching the report if anything fails.
//!
//! Configuration comes from `SUBSCORE__*` environment variables (a `.env` file
//! is honoured), or from the TOML file named by `SUBSCORE_CONFIG`. A named file
//! that cannot be loaded ends the run with a configuration error.

use std::path::PathBuf;
use std::process::ExitCode;

use subscore_core::{
    config::Config,
    pipeline::{self, RunOptions},
    telemetry,
};

fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config_path = std::env::var_os("SUBSCORE_CONFIG").map(PathBuf::from);
    let config = match Config::load_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::from(e.code().exit_code() as u8));
        }
    };

    telemetry::init_logging(&config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting scoring run");

    let paths = config.paths.resolve();
    match pipeline::run(&paths, RunOptions::default()) {
        Ok(summary) => {
            tracing::info!(
                output = %paths.output.display(),
                entries = summary.report.subs.len(),
                "Scoring run complete"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            e.log();
            eprintln!("{}", e);
            Ok(ExitCode::from(e.code().exit_code() as u8))
        }
    }
}
