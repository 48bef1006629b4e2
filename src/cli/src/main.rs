//! Subscore CLI - score and maintain a channel's interaction logs.
//!
//! Provides commands to run the scoring pipeline, check the input logs, and
//! append entries to the manual log.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use subscore_core::{config::Config, telemetry, ScoreError};

use commands::{add, check, score};
use output::OutputFormat;

/// Subscore - engagement scoring for channel interaction logs
#[derive(Parser)]
#[command(
    name = "subscore",
    version,
    about = "Subscore - engagement scoring for channel interaction logs",
    long_about = "Scores subscribers and commenters from the collector's log, merges the \
                  hand-maintained supporter list on top, and writes a JSON report.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "SUBSCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Working directory containing the logs (overrides configuration)
    #[arg(short = 'C', long, global = true)]
    dir: Option<PathBuf>,

    /// Log level for diagnostics on stderr (overrides configuration)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score both logs and write the report
    Score(score::ScoreArgs),

    /// Read both logs and summarise them without scoring
    Check(check::CheckArgs),

    /// Append an entry to the manual log
    Add(add::AddArgs),
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(dir) = &cli.dir {
        config.paths.working_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.no_color {
        config.logging.ansi = false;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    telemetry::init_logging(&config.logging)?;

    let paths = config.paths.resolve();
    let format = cli.output;

    match cli.command {
        Commands::Score(args) => score::execute(args, &paths, format),
        Commands::Check(args) => check::execute(args, &paths, format),
        Commands::Add(args) => add::execute(args, &paths, format),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        output::print_error(&format!("{:#}", e));
        let status = e
            .downcast_ref::<ScoreError>()
            .map(|err| {
                err.log();
                err.code().exit_code()
            })
            .unwrap_or(1);
        std::process::exit(status);
    }
}
